use crate::error::Result;
use crate::harvest::PaginationConfig;
use crate::tools::output::report_output;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the extract_all_pages tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractAllPagesParams {
    /// Pagination timing and page cap; every field is optional
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Directory to also write the CSV file into
    #[serde(default)]
    pub output_dir: Option<String>,
}

/// Walks every page of the listing in the active tab, then deduplicates the union
#[derive(Default)]
pub struct ExtractAllPagesTool;

impl Tool for ExtractAllPagesTool {
    type Params = ExtractAllPagesParams;

    fn name(&self) -> &str {
        "extract_all_pages"
    }

    fn execute_typed(&self, params: ExtractAllPagesParams, context: &mut ToolContext) -> Result<ToolResult> {
        let report = context
            .session
            .harvest_all_pages(params.pagination, context.cancel.clone())?;
        log::info!("{}", report.status_message());

        let output = report_output(&report, params.output_dir.as_deref())?;
        Ok(ToolResult::success_with(output))
    }
}
