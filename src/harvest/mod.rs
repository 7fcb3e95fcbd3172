//! Harvesting a listing table across pages
//!
//! [`Harvester`] drives a [`PageHost`] (a live browser tab, or a simulated page
//! in tests) through the pagination state machine and deduplicates what it
//! collected once at the end.

pub mod config;
pub mod events;
pub mod extractor;
pub mod strategy;

pub use config::PaginationConfig;
pub use events::{EventLog, HarvestEvent, StopReason};
pub use extractor::Harvester;
pub use strategy::{CityNameStrategy, NextControlStrategy, PageCountStrategy, StrategySet};

use crate::dom::{ElementSelector, PageSnapshot, Table};
use crate::error::Result;
use serde::Serialize;

/// A located control leading to another page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle {
    /// Page the control leads to
    pub page: u32,

    /// How to find the control again
    pub selector: ElementSelector,

    /// Name of the strategy that located it
    pub strategy: &'static str,
}

/// What the harvester needs from the page it scrapes
pub trait PageHost {
    /// The table visible right now, header first; empty when there is none
    fn extract_table(&mut self) -> Result<Table>;

    /// Controls, landmarks and text of the page as it is right now
    fn snapshot(&mut self) -> Result<PageSnapshot>;

    /// Click a control located in the latest snapshot
    fn activate(&mut self, control: &ControlHandle) -> Result<()>;

    /// A value that changes whenever the visible table's content changes
    fn table_signature(&mut self) -> Result<Option<String>>;
}

/// Result of a harvest, single page or paginated
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Deduplicated table, header first
    pub rows: Table,

    /// Label of the listing, when one was found
    pub city_name: Option<String>,

    /// Data rows collected before deduplication, header excluded
    pub original_count: usize,

    /// Data rows left after deduplication, header excluded; `rows` holds one
    /// more line than this when a header is present
    pub deduplicated_count: usize,

    /// Pages walked, only set for paginated runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_processed: Option<u32>,

    /// Set when no name or phone column allowed deduplication
    pub deduplication_skipped: bool,

    pub events: Vec<HarvestEvent>,
}

impl HarvestReport {
    /// Number of rows dropped as duplicates
    pub fn duplicates_removed(&self) -> usize {
        self.original_count.saturating_sub(self.deduplicated_count)
    }

    /// Whether the report covers every page of the listing
    pub fn is_complete(&self) -> bool {
        self.pages_processed.is_some()
    }

    /// Events signalling degraded but non-fatal outcomes
    pub fn warnings(&self) -> impl Iterator<Item = &HarvestEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }

    /// Short human-readable outcome
    pub fn status_message(&self) -> String {
        if self.rows.is_empty() {
            return "No table found on this page.".to_string();
        }

        let removed = self.duplicates_removed();
        if removed > 0 {
            format!(
                "Export completed! {} rows exported ({} duplicates removed).",
                self.deduplicated_count, removed
            )
        } else {
            format!("Export completed! {} rows exported.", self.deduplicated_count)
        }
    }
}
