//! Tool system exposing harvest operations to JSON-driven callers
//!
//! Each tool takes typed parameters (with a generated JSON schema) and returns
//! a [`ToolResult`]. The MCP server and [`BrowserSession::execute_tool`] both
//! dispatch through a [`ToolRegistry`].

pub mod extract_all_pages;
pub mod extract_table;
pub mod navigate;
mod output;

pub use extract_all_pages::{ExtractAllPagesParams, ExtractAllPagesTool};
pub use extract_table::{ExtractTableParams, ExtractTableTool};
pub use navigate::{NavigateParams, NavigateTool, normalize_url};

use crate::browser::BrowserSession;
use crate::error::{HarvestError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// What a tool may touch while it runs
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,

    /// Cancels long-running tools such as multi-page extraction
    pub cancel: CancellationToken,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session, cancel: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A harvest operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of [`Tool::Params`]
    fn parameters_schema(&self) -> Value {
        schemars::schema_for!(Self::Params).to_value()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params: Self::Params = serde_json::from_value(params)
            .map_err(|e| HarvestError::InvalidParams(format!("{}: {}", Tool::name(self), e)))?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of a [`Tool`], used for storage in the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(ExtractTableTool);
        registry.register(ExtractAllPagesTool);
        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = Tool::name(&tool).to_string();
        self.tools.insert(name, Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| HarvestError::ToolNotFound(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ToolRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["navigate", "extract_table", "extract_all_pages"]);
        assert!(registry.has("extract_all_pages"));
        assert!(!registry.has("click"));
    }

    #[test]
    fn test_registry_schemas_are_objects() {
        let registry = ToolRegistry::with_defaults();
        for name in registry.names() {
            let schema = registry.get(name).unwrap().parameters_schema();
            assert!(schema.is_object(), "schema of {} is not an object", name);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("navigate").is_none());
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::success_with(serde_json::json!({"rows": []}));
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = ToolResult::failure("boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let json = serde_json::to_value(ToolResult::success()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }
}
