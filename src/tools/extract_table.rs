use crate::error::Result;
use crate::tools::output::report_output;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the extract_table tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractTableParams {
    /// Directory to also write the CSV file into
    #[serde(default)]
    pub output_dir: Option<String>,
}

/// Extracts and deduplicates the table currently visible in the active tab
#[derive(Default)]
pub struct ExtractTableTool;

impl Tool for ExtractTableTool {
    type Params = ExtractTableParams;

    fn name(&self) -> &str {
        "extract_table"
    }

    fn execute_typed(&self, params: ExtractTableParams, context: &mut ToolContext) -> Result<ToolResult> {
        let report = context.session.harvest_page()?;
        log::info!("{}", report.status_message());

        let output = report_output(&report, params.output_dir.as_deref())?;
        Ok(ToolResult::success_with(output))
    }
}
