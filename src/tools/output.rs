use crate::error::Result;
use crate::export;
use crate::harvest::HarvestReport;
use serde_json::{Value, json};
use std::path::Path;

/// JSON payload shared by the extraction tools
pub(crate) fn report_output(report: &HarvestReport, output_dir: Option<&str>) -> Result<Value> {
    let csv = export::to_csv_string(&report.rows)?;
    let filename = export::report_filename(report);

    let path = match output_dir {
        Some(dir) => Some(export::write_csv(Path::new(dir), report)?.display().to_string()),
        None => None,
    };

    let warnings: Vec<String> = report.warnings().map(|event| event.to_string()).collect();

    let mut output = json!({
        "rows": report.rows,
        "city_name": report.city_name,
        "original_count": report.original_count,
        "deduplicated_count": report.deduplicated_count,
        "duplicates_removed": report.duplicates_removed(),
        "deduplication_skipped": report.deduplication_skipped,
        "message": report.status_message(),
        "warnings": warnings,
        "csv": csv,
        "filename": filename,
    });

    if let Some(pages) = report.pages_processed {
        output["pages_processed"] = json!(pages);
    }
    if let Some(path) = path {
        output["path"] = json!(path);
    }

    Ok(output)
}
