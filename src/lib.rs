//! # table-harvest
//!
//! Scrape the listing table of a web page through Chrome DevTools Protocol (CDP),
//! walking its pagination, removing duplicate businesses and exporting CSV.
//!
//! ## Features
//!
//! - **Paginated extraction**: an explicit state machine clicks through page
//!   controls, waits for the table to change and accumulates rows
//! - **Deduplication**: rows are identified by normalized business name and
//!   phone number; a row sharing either with an earlier row is dropped
//! - **Pluggable detection**: page count, next-page control and listing label
//!   are found by ordered strategies that can be replaced
//! - **CSV export**: RFC 4180 quoting, dated filename derived from the listing label
//! - **MCP Server** and **CLI** front-ends
//!
//! ## Command line
//!
//! ```bash
//! # Visible page only
//! cargo run --bin table-harvest -- https://listings.example.com/lyon
//!
//! # Every page, with a visible browser
//! cargo run --bin table-harvest -- --all-pages --headed https://listings.example.com/lyon
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use table_harvest::{BrowserSession, LaunchOptions, PaginationConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # fn main() -> table_harvest::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://listings.example.com/lyon")?;
//! session.wait_for_navigation()?;
//!
//! let report = session.harvest_all_pages(PaginationConfig::default(), CancellationToken::new())?;
//! println!("{}", report.status_message());
//!
//! let path = table_harvest::export::write_csv(std::path::Path::new("."), &report)?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Deduplicating a table you already have
//!
//! ```rust
//! use table_harvest::{Table, deduplicate};
//!
//! let table: Table = vec![
//!     vec!["Business Name", "Phone"],
//!     vec!["Acme Realty", "01 23 45 67 89"],
//!     vec!["ACME realty.", "09 99 99 99 99"],
//! ]
//! .into_iter()
//! .collect();
//!
//! let result = deduplicate(&table);
//! assert_eq!(result.stats.kept, 1);
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`dom`]: Table extraction and page snapshots
//! - [`dedup`]: Name and phone normalization, deduplication
//! - [`harvest`]: Pagination state machine, detection strategies, events
//! - [`export`]: CSV rendering and file naming
//! - [`tools`]: JSON-driven harvest tools
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dedup;
pub mod dom;
pub mod error;
pub mod export;
pub mod harvest;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserPage, BrowserSession, ConnectionOptions, LaunchOptions};
pub use dedup::{Deduplication, deduplicate, normalize_name, normalize_phone};
pub use dom::{ControlNode, ElementSelector, PageSnapshot, SelectorMap, Table};
pub use error::{HarvestError, Result};
pub use harvest::{HarvestEvent, HarvestReport, Harvester, PageHost, PaginationConfig, StrategySet};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::HarvestServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
