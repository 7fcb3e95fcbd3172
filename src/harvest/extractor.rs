use crate::dedup::{self, Deduplication};
use crate::dom::{PageSnapshot, Table};
use crate::error::{HarvestError, Result};
use crate::harvest::{
    ControlHandle, EventLog, HarvestEvent, HarvestReport, PageHost, PaginationConfig, StopReason, StrategySet,
};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Longest uninterrupted sleep between two cancellation checks
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(25);

/// Where the pagination state machine stands
#[derive(Debug)]
enum State {
    Extracting(u32),
    AwaitingNavigation(ControlHandle),
    AwaitingStabilization { page: u32, before: Option<String> },
    Done(StopReason),
}

/// Per-run pagination state, dropped when the run ends
#[derive(Debug, Default)]
struct PaginationState {
    page: u32,
    total: Option<u32>,
    rows: Table,
    events: EventLog,
}

/// Extracts a listing table from a page, walking its pagination when asked to
pub struct Harvester {
    config: PaginationConfig,
    strategies: StrategySet,
    cancel: CancellationToken,
}

impl Default for Harvester {
    fn default() -> Self {
        Self::new(PaginationConfig::default())
    }
}

impl Harvester {
    /// Create a harvester with the default detection strategies
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            strategies: StrategySet::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Builder method: replace the detection strategies
    pub fn with_strategies(mut self, strategies: StrategySet) -> Self {
        self.strategies = strategies;
        self
    }

    /// Builder method: abort runs when this token is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Extract and deduplicate the table currently visible, without navigating
    pub fn extract_single_page<H: PageHost + ?Sized>(&self, host: &mut H) -> Result<HarvestReport> {
        let mut run = PaginationState::default();

        let snapshot = host.snapshot()?;
        let city_name = self.resolve_city_name(&snapshot, &mut run.events);

        let table = host.extract_table()?;
        run.events.emit(HarvestEvent::PageExtracted { page: 1, rows: table.data_len() });

        Ok(Self::finish(table, city_name, None, run.events))
    }

    /// Extract the table of every page, following the page controls, then deduplicate.
    ///
    /// Any host error or a cancellation aborts the run and discards what was
    /// collected so far.
    pub fn extract_all_pages<H: PageHost + ?Sized>(&self, host: &mut H) -> Result<HarvestReport> {
        let mut run = PaginationState { page: 1, ..Default::default() };

        let snapshot = host.snapshot()?;
        let city_name = self.resolve_city_name(&snapshot, &mut run.events);
        run.total = self.detect_total_pages(&snapshot, &mut run.events);

        let mut state = State::Extracting(1);
        let reason = loop {
            self.check_cancelled()?;
            state = match state {
                State::Extracting(page) => self.extract_page(host, page, &mut run)?,
                State::AwaitingNavigation(control) => self.navigate(host, control, &mut run)?,
                State::AwaitingStabilization { page, before } => {
                    self.wait_for_table_update(host, page, before.as_deref(), &mut run.events)?;
                    State::Extracting(page)
                }
                State::Done(reason) => break reason,
            };
        };

        run.events.emit(HarvestEvent::PaginationStopped { page: run.page, reason });
        log::info!(
            "Extraction completed. Total of {} rows from {} pages.",
            run.rows.len(),
            run.page
        );

        Ok(Self::finish(run.rows, city_name, Some(run.page), run.events))
    }

    fn resolve_city_name(&self, snapshot: &PageSnapshot, events: &mut EventLog) -> Option<String> {
        let resolved = self.strategies.resolve_city_name(snapshot);
        let (city_name, strategy) = match resolved {
            Some((name, strategy)) => (Some(name), Some(strategy.to_string())),
            None => (None, None),
        };
        events.emit(HarvestEvent::CityNameResolved { city_name: city_name.clone(), strategy });
        city_name
    }

    fn detect_total_pages(&self, snapshot: &PageSnapshot, events: &mut EventLog) -> Option<u32> {
        let detected = self.strategies.detect_total_pages(snapshot);
        events.emit(HarvestEvent::TotalPagesDetected {
            total: detected.map(|(total, _)| total),
            strategy: detected.map(|(_, strategy)| strategy.to_string()),
        });
        detected.map(|(total, _)| total)
    }

    /// Extracting(page): collect rows, then decide whether there is a next page
    fn extract_page<H: PageHost + ?Sized>(&self, host: &mut H, page: u32, run: &mut PaginationState) -> Result<State> {
        run.page = page;
        match run.total {
            Some(total) => log::info!("Extracting page {} of {}...", page, total),
            None => log::info!("Extracting page {}...", page),
        }

        let table = host.extract_table()?;
        let added = if table.is_empty() {
            0
        } else if page == 1 {
            // First page: header and data
            let data = table.data_len();
            run.rows.extend(table.into_rows());
            data
        } else {
            // Following pages repeat the header, keep data only
            let data = table.data_len();
            run.rows.extend(table.into_rows().into_iter().skip(1));
            data
        };
        run.events.emit(HarvestEvent::PageExtracted { page, rows: added });

        if run.total.is_some_and(|total| page >= total) {
            return Ok(State::Done(StopReason::LastPageReached));
        }
        if self.config.max_pages.is_some_and(|max| page >= max) {
            return Ok(State::Done(StopReason::MaxPagesReached));
        }

        let next = page + 1;
        let snapshot = host.snapshot()?;
        let Some((control, strategy)) = self.strategies.locate_control(&snapshot, next) else {
            log::info!("No next page found after page {}", page);
            return Ok(State::Done(StopReason::NoNextControl));
        };

        log::debug!("Control for page {} via {}: {}", next, strategy, control.to_simple_string());

        // Property only, enabled buttons may carry classes like `disabled:opacity-50`
        if control.disabled {
            log::info!("Control for page {} is disabled", next);
            return Ok(State::Done(StopReason::NextControlDisabled));
        }

        let Some(selector) = snapshot.selector_for(control) else {
            log::warn!("Control for page {} carries no reference, cannot click it", next);
            return Ok(State::Done(StopReason::NoNextControl));
        };

        Ok(State::AwaitingNavigation(ControlHandle {
            page: next,
            selector: selector.clone(),
            strategy,
        }))
    }

    /// AwaitingNavigation: click, then give the page its fixed settle delay
    fn navigate<H: PageHost + ?Sized>(&self, host: &mut H, control: ControlHandle, run: &mut PaginationState) -> Result<State> {
        let before = host.table_signature()?;

        run.events.emit(HarvestEvent::NavigationStarted {
            page: control.page,
            strategy: control.strategy.to_string(),
        });
        host.activate(&control)?;

        self.pause(self.config.settle_delay_duration())?;

        Ok(State::AwaitingStabilization { page: control.page, before })
    }

    /// AwaitingStabilization: poll until the table differs from `before`, or give up
    /// after the configured ceiling and carry on anyway
    fn wait_for_table_update<H: PageHost + ?Sized>(
        &self,
        host: &mut H,
        page: u32,
        before: Option<&str>,
        events: &mut EventLog,
    ) -> Result<()> {
        let timeout = self.config.stabilization_timeout_duration();
        let interval = self.config.poll_interval_duration();
        let mut waited = Duration::ZERO;

        while waited < timeout {
            self.pause(interval)?;
            waited += interval;

            let current = host.table_signature()?;
            if current.is_some() && current.as_deref() != before {
                self.pause(self.config.grace_delay_duration())?;
                events.emit(HarvestEvent::PageStabilized { page, waited_ms: millis(waited) });
                return Ok(());
            }
        }

        events.emit(HarvestEvent::StabilizationTimedOut { page, waited_ms: millis(waited) });
        Ok(())
    }

    /// Done: deduplicate everything collected, once
    fn finish(rows: Table, city_name: Option<String>, pages_processed: Option<u32>, mut events: EventLog) -> HarvestReport {
        let Deduplication { table, stats, skipped, duplicates, .. } = dedup::deduplicate(&rows);

        for duplicate in duplicates {
            events.emit(HarvestEvent::DuplicateDropped {
                row_number: duplicate.row_number,
                keys: duplicate.keys,
            });
        }
        if skipped {
            events.emit(HarvestEvent::DeduplicationSkipped);
        } else {
            events.emit(HarvestEvent::DeduplicationCompleted {
                original: stats.original,
                kept: stats.kept,
                discarded: stats.discarded,
            });
        }

        HarvestReport {
            rows: table,
            city_name,
            original_count: stats.original,
            deduplicated_count: stats.kept,
            pages_processed,
            deduplication_skipped: skipped,
            events: events.into_events(),
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(HarvestError::Cancelled);
        }
        Ok(())
    }

    /// Sleep for `duration`, waking up regularly to honour cancellation
    fn pause(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check_cancelled()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(CANCEL_CHECK_INTERVAL));
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
