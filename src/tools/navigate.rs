use crate::dom;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Schemes a listing URL may already carry
const KNOWN_SCHEMES: [&str; 5] = ["http://", "https://", "file://", "data:", "about:"];

/// Add the scheme a listing URL was typed without: `http` for local servers,
/// `https` otherwise
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if KNOWN_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) || trimmed.starts_with('/') {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL of the listing page
    pub url: String,

    /// Wait for the page to finish loading (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,
}

fn default_wait() -> bool {
    true
}

/// Opens a listing page in the active tab and reports whether it shows a table
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(
        &self,
        params: NavigateParams,
        context: &mut ToolContext,
    ) -> Result<ToolResult> {
        let normalized_url = normalize_url(&params.url);

        context.session.navigate(&normalized_url)?;

        if params.wait_for_load {
            context.session.wait_for_navigation()?;
        }

        let table_found = dom::table_signature(&context.session.tab()?)?.is_some();
        log::info!("Opened {} (table found: {})", normalized_url, table_found);

        Ok(ToolResult::success_with(serde_json::json!({
            "original_url": params.url,
            "normalized_url": normalized_url,
            "waited": params.wait_for_load,
            "table_found": table_found
        })))
    }
}
