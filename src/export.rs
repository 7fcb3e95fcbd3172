//! CSV export of harvested tables

use crate::dom::Table;
use crate::error::{HarvestError, Result};
use crate::harvest::HarvestReport;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};

/// Filename stem used when the listing has no usable name
const FALLBACK_STEM: &str = "export";

/// Render a table as CSV: CRLF line ends, fields quoted only when they
/// contain a comma, a quote or a line break, quotes doubled
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::<u8>::new());

    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| HarvestError::Io(error.into_error()))?;
    String::from_utf8(bytes).map_err(|error| {
        HarvestError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
    })
}

/// Turn a listing name into a filename-safe stem, `export` when nothing is left
pub fn slugify(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect();

    let slug = cleaned
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() { FALLBACK_STEM.to_string() } else { slug }
}

/// `{slug}_{page|complete}_{YYYY-MM-DD}.csv`
pub fn export_filename(city_name: Option<&str>, complete: bool, date: NaiveDate) -> String {
    let stem = city_name.map_or_else(|| FALLBACK_STEM.to_string(), slugify);
    let kind = if complete { "complete" } else { "page" };
    format!("{}_{}_{}.csv", stem, kind, date.format("%Y-%m-%d"))
}

/// Filename for a report, dated today (UTC)
pub fn report_filename(report: &HarvestReport) -> String {
    export_filename(
        report.city_name.as_deref(),
        report.is_complete(),
        chrono::Utc::now().date_naive(),
    )
}

/// Write a report's table as CSV into `dir` and return the file path
pub fn write_csv(dir: &Path, report: &HarvestReport) -> Result<PathBuf> {
    let path = dir.join(report_filename(report));
    let content = to_csv_string(&report.rows)?;
    std::fs::write(&path, content)?;
    log::info!("Wrote {} rows to {}", report.rows.len(), path.display());
    Ok(path)
}
