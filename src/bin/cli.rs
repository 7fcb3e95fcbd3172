//! table-harvest command line
//!
//! Opens a listing page, extracts its table (one page or every page), removes
//! duplicate businesses and writes the result as CSV.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use table_harvest::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use table_harvest::harvest::{HarvestReport, PaginationConfig};
use table_harvest::{HarvestError, export};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "table-harvest")]
#[command(version)]
#[command(about = "Scrape a paginated listing table, deduplicate it and export it as CSV", long_about = None)]
struct Cli {
    /// Listing URL to open first; the active tab is used as-is when omitted
    url: Option<String>,

    /// WebSocket endpoint of a running browser to connect to instead of launching one
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Walk every page of the listing instead of the visible one
    #[arg(long, short = 'a')]
    all_pages: bool,

    /// Wait after clicking a page control, in milliseconds
    #[arg(long, default_value_t = 2000)]
    settle_delay_ms: u64,

    /// Interval between table change checks, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_interval_ms: u64,

    /// How long to wait for the table to change, in milliseconds
    #[arg(long, default_value_t = 1000)]
    stabilization_timeout_ms: u64,

    /// Extra wait once the table changed, in milliseconds
    #[arg(long, default_value_t = 500)]
    grace_delay_ms: u64,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Directory the CSV file is written into
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn pagination(&self) -> PaginationConfig {
        PaginationConfig {
            settle_delay_ms: self.settle_delay_ms,
            poll_interval_ms: self.poll_interval_ms,
            stabilization_timeout_ms: self.stabilization_timeout_ms,
            grace_delay_ms: self.grace_delay_ms,
            max_pages: self.max_pages,
        }
    }

    fn open_session(&self) -> table_harvest::Result<BrowserSession> {
        match self.ws_endpoint {
            Some(ref url) => BrowserSession::connect(ConnectionOptions::new(url)),
            None => {
                let mut options = LaunchOptions::new().headless(!self.headed);
                if let Some(ref path) = self.executable_path {
                    options = options.chrome_path(path);
                }
                BrowserSession::launch(options)
            }
        }
    }
}

fn harvest(cli: &Cli, cancel: CancellationToken) -> table_harvest::Result<HarvestReport> {
    let session = cli.open_session()?;

    if let Some(ref url) = cli.url {
        let url = table_harvest::tools::normalize_url(url);
        session.navigate(&url)?;
        session.wait_for_navigation()?;
    }

    if cli.all_pages {
        session.harvest_all_pages(cli.pagination(), cancel)
    } else {
        session.harvest_page()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current step");
            interrupt.cancel();
        }
    });

    let (cli, report) = tokio::task::spawn_blocking(move || {
        let report = harvest(&cli, cancel);
        (cli, report)
    })
    .await
    .context("Harvest task panicked")?;

    let report = match report {
        Ok(report) => report,
        Err(HarvestError::Cancelled) => {
            eprintln!("Harvest cancelled, nothing exported.");
            std::process::exit(130);
        }
        Err(e) => return Err(e).context("Harvest failed"),
    };

    for warning in report.warnings() {
        eprintln!("warning: {}", warning);
    }

    if !report.rows.is_empty() {
        let path = export::write_csv(&cli.output_dir, &report)
            .with_context(|| format!("Failed to write CSV into {}", cli.output_dir.display()))?;
        eprintln!("Saved {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.status_message());
    }

    Ok(())
}
