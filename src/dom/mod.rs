//! Page probing module
//!
//! This module captures what the harvester needs from a live page as plain data:
//! - Table: the single listing table, header first
//! - ControlNode: a clickable candidate such as a pagination button
//! - PageSnapshot: controls, label landmarks and page text seen at one instant
//! - SelectorMap: mapping of snapshot references to element selectors

pub mod element;
pub mod selector_map;
pub mod snapshot;
pub mod table;

pub use element::{ControlNode, parse_leading_int};
pub use selector_map::{ElementSelector, SelectorMap};
pub use snapshot::{Landmark, PageSnapshot};
pub use table::Table;

use crate::error::{HarvestError, Result};
use headless_chrome::Tab;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ExtractedTable {
    found: bool,
    rows: Vec<Vec<String>>,
}

/// Extract the first table of the page; an absent table yields an empty [`Table`]
pub fn extract_table(tab: &Arc<Tab>) -> Result<Table> {
    let js_code = include_str!("extract_table.js");

    let result = tab
        .evaluate(js_code, false)
        .map_err(|e| HarvestError::EvaluationFailed(format!("Failed to execute table extraction script: {}", e)))?;

    let json_value = result
        .value
        .ok_or_else(|| HarvestError::EvaluationFailed("No value returned from table extraction".to_string()))?;

    let json_str: String = serde_json::from_value(json_value)
        .map_err(|e| HarvestError::EvaluationFailed(format!("Failed to get JSON string: {}", e)))?;

    let extracted: ExtractedTable = serde_json::from_str(&json_str)
        .map_err(|e| HarvestError::EvaluationFailed(format!("Failed to parse table JSON: {}", e)))?;

    if !extracted.found {
        log::debug!("No table element on the page");
    }

    Ok(Table::from_rows(extracted.rows))
}

/// Serialized content of the first table, `None` when the page has no table
pub fn table_signature(tab: &Arc<Tab>) -> Result<Option<String>> {
    let js_code = include_str!("table_signature.js");

    let result = tab
        .evaluate(js_code, false)
        .map_err(|e| HarvestError::EvaluationFailed(format!("Failed to read table content: {}", e)))?;

    Ok(result.value.and_then(|value| value.as_str().map(str::to_string)))
}

/// Capture a snapshot of the page's controls and landmarks
pub fn capture_snapshot(tab: &Arc<Tab>) -> Result<PageSnapshot> {
    PageSnapshot::from_tab(tab)
}
