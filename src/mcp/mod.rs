//! MCP (Model Context Protocol) server for table harvesting
//!
//! Each MCP tool forwards to the matching tool of the session's
//! [`ToolRegistry`](crate::tools::ToolRegistry).

pub mod handler;
pub use handler::HarvestServer;

use crate::harvest::PaginationConfig;
use crate::tools::{ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    ErrorData as McpError, RoleServer,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    service::RequestContext,
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Navigate tool parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL of the listing page
    pub url: String,
    /// Wait for the page to finish loading (default: true)
    #[serde(default = "default_true")]
    pub wait_for_load: bool,
}

/// Single page extraction parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractTableParams {
    /// Directory to also write the CSV file into
    #[serde(default)]
    pub output_dir: Option<String>,
}

/// Paginated extraction parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractAllPagesParams {
    /// Pagination timing and page cap
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,
    /// Directory to also write the CSV file into
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = if let Some(data) = result.data {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

/// Run blocking CDP work off the async runtime
///
/// `cancel` fires when the request is cancelled by the client, and also when
/// the returned future is dropped before the work finishes.
async fn run_blocking<T, F>(cancel: CancellationToken, work: F) -> Result<T, McpError>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> T + Send + 'static,
{
    let guard = cancel.clone().drop_guard();
    let outcome = tokio::task::spawn_blocking(move || work(cancel)).await;
    guard.disarm();
    outcome.map_err(|e| McpError::internal_error(format!("Tool task failed: {}", e), None))
}

impl HarvestServer {
    async fn run_tool(
        &self,
        name: &'static str,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        let server = self.clone();
        let result = run_blocking(cancel, move |cancel| {
            let session = server.session();
            let mut context = ToolContext::new(&session).with_cancellation(cancel);
            session.tool_registry().execute(name, params, &mut context)
        })
        .await?
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        convert_result(result)
    }
}

#[tool_router]
impl HarvestServer {
    /// Open a listing page
    #[tool(description = "Open a listing page in the browser and report whether it shows a table")]
    async fn harvest_navigate(
        &self,
        params: Parameters<NavigateParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_params = serde_json::json!({
            "url": params.0.url,
            "wait_for_load": params.0.wait_for_load
        });
        self.run_tool("navigate", tool_params, context.ct).await
    }

    /// Extract the visible table
    #[tool(description = "Extract and deduplicate the table visible on the current page, returned as rows and CSV")]
    async fn harvest_extract_table(
        &self,
        params: Parameters<ExtractTableParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_params = serde_json::json!({ "output_dir": params.0.output_dir });
        self.run_tool("extract_table", tool_params, context.ct).await
    }

    /// Walk every page of the listing
    #[tool(
        description = "Walk every page of the listing, extract each page's table, then deduplicate the union. Returns rows, counts and CSV"
    )]
    async fn harvest_extract_all_pages(
        &self,
        params: Parameters<ExtractAllPagesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let mut tool_params = serde_json::json!({ "output_dir": params.0.output_dir });
        if let Some(pagination) = params.0.pagination {
            tool_params["pagination"] = serde_json::to_value(pagination)
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        }
        self.run_tool("extract_all_pages", tool_params, context.ct).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_success() {
        let result = convert_result(InternalToolResult::success_with(serde_json::json!({"rows": [["Title"]]})));
        assert!(result.is_ok());
    }

    #[test]
    fn test_convert_failure() {
        let result = convert_result(InternalToolResult::failure("no table"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_all_pages_params_optional() {
        let params: ExtractAllPagesParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.pagination.is_none());
        assert!(params.output_dir.is_none());
    }

    #[tokio::test]
    async fn test_request_cancellation_reaches_blocking_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let work = run_blocking(cancel, |cancel| {
            while !cancel.is_cancelled() {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
            "stopped"
        });
        trigger.cancel();

        assert_eq!(work.await.unwrap(), "stopped");
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_blocking_work() {
        let cancel = CancellationToken::new();
        let observer = cancel.clone();
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let work = tokio::spawn(run_blocking(cancel, move |cancel| {
            let _ = started_tx.send(());
            while !cancel.is_cancelled() {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
        }));
        tokio::task::spawn_blocking(move || started_rx.recv()).await.unwrap().unwrap();
        work.abort();

        tokio::time::timeout(std::time::Duration::from_secs(5), observer.cancelled())
            .await
            .unwrap();
    }
}
