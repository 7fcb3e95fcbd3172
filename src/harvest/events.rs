use serde::Serialize;
use std::fmt;

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The detected page count was reached
    LastPageReached,
    /// No control for the next page was found
    NoNextControl,
    /// A control for the next page exists but is disabled
    NextControlDisabled,
    /// The configured page cap was reached
    MaxPagesReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::LastPageReached => "all detected pages processed",
            StopReason::NoNextControl => "no next page found",
            StopReason::NextControlDisabled => "next page control is disabled",
            StopReason::MaxPagesReached => "page limit reached",
        };
        f.write_str(text)
    }
}

/// Something worth reporting that happened during a harvest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HarvestEvent {
    CityNameResolved {
        city_name: Option<String>,
        strategy: Option<String>,
    },
    TotalPagesDetected {
        total: Option<u32>,
        strategy: Option<String>,
    },
    PageExtracted {
        page: u32,
        rows: usize,
    },
    NavigationStarted {
        page: u32,
        strategy: String,
    },
    PageStabilized {
        page: u32,
        waited_ms: u64,
    },
    StabilizationTimedOut {
        page: u32,
        waited_ms: u64,
    },
    PaginationStopped {
        page: u32,
        reason: StopReason,
    },
    DuplicateDropped {
        row_number: usize,
        keys: Vec<String>,
    },
    DeduplicationSkipped,
    DeduplicationCompleted {
        original: usize,
        kept: usize,
        discarded: usize,
    },
}

impl HarvestEvent {
    /// Log level the event is mirrored at
    pub fn level(&self) -> log::Level {
        match self {
            HarvestEvent::StabilizationTimedOut { .. } | HarvestEvent::DeduplicationSkipped => log::Level::Warn,
            HarvestEvent::DuplicateDropped { .. } | HarvestEvent::PageStabilized { .. } => log::Level::Debug,
            _ => log::Level::Info,
        }
    }

    /// Whether the event signals a degraded but non-fatal outcome
    pub fn is_warning(&self) -> bool {
        self.level() == log::Level::Warn
    }
}

impl fmt::Display for HarvestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestEvent::CityNameResolved { city_name: Some(name), strategy } => {
                write!(f, "City name found via {}: {}", strategy.as_deref().unwrap_or("unknown"), name)
            }
            HarvestEvent::CityNameResolved { city_name: None, .. } => write!(f, "No city name found"),
            HarvestEvent::TotalPagesDetected { total: Some(total), strategy } => {
                write!(f, "Total pages detected: {} (via {})", total, strategy.as_deref().unwrap_or("unknown"))
            }
            HarvestEvent::TotalPagesDetected { total: None, .. } => write!(f, "Total pages detected: unknown"),
            HarvestEvent::PageExtracted { page, rows } => write!(f, "Extracted {} rows from page {}", rows, page),
            HarvestEvent::NavigationStarted { page, strategy } => {
                write!(f, "Clicking on page {} (control found via {})", page, strategy)
            }
            HarvestEvent::PageStabilized { page, waited_ms } => {
                write!(f, "Table updated for page {} after {} ms", page, waited_ms)
            }
            HarvestEvent::StabilizationTimedOut { page, waited_ms } => write!(
                f,
                "Table does not seem to have updated in time for page {} (waited {} ms)",
                page, waited_ms
            ),
            HarvestEvent::PaginationStopped { page, reason } => {
                write!(f, "Pagination stopped after page {}: {}", page, reason)
            }
            HarvestEvent::DuplicateDropped { row_number, keys } => {
                write!(f, "Duplicate detected at row {}: {}", row_number, keys.join(", "))
            }
            HarvestEvent::DeduplicationSkipped => write!(f, "No name or phone column found for deduplication"),
            HarvestEvent::DeduplicationCompleted { original, kept, discarded } => write!(
                f,
                "Deduplication applied: {} -> {} rows ({} duplicates removed)",
                original, kept, discarded
            ),
        }
    }
}

/// Ordered record of the events of one run, mirrored to the `log` facade
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<HarvestEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and log it
    pub fn emit(&mut self, event: HarvestEvent) {
        log::log!(event.level(), "{}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[HarvestEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<HarvestEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_levels() {
        assert!(HarvestEvent::DeduplicationSkipped.is_warning());
        assert!(HarvestEvent::StabilizationTimedOut { page: 2, waited_ms: 1000 }.is_warning());
        assert!(!HarvestEvent::PageExtracted { page: 1, rows: 10 }.is_warning());
        assert_eq!(
            HarvestEvent::DuplicateDropped { row_number: 3, keys: vec![] }.level(),
            log::Level::Debug
        );
    }

    #[test]
    fn test_event_display() {
        let event = HarvestEvent::PaginationStopped { page: 3, reason: StopReason::LastPageReached };
        assert_eq!(event.to_string(), "Pagination stopped after page 3: all detected pages processed");

        let event = HarvestEvent::CityNameResolved { city_name: None, strategy: None };
        assert_eq!(event.to_string(), "No city name found");
    }

    #[test]
    fn test_event_serialization() {
        let event = HarvestEvent::PageExtracted { page: 2, rows: 25 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"event": "page_extracted", "page": 2, "rows": 25}));

        let json = serde_json::to_value(HarvestEvent::DeduplicationSkipped).unwrap();
        assert_eq!(json, serde_json::json!({"event": "deduplication_skipped"}));
    }

    #[test]
    fn test_event_log_keeps_order() {
        let mut log = EventLog::new();
        log.emit(HarvestEvent::PageExtracted { page: 1, rows: 1 });
        log.emit(HarvestEvent::PageExtracted { page: 2, rows: 1 });

        let pages: Vec<u32> = log
            .events()
            .iter()
            .filter_map(|e| match e {
                HarvestEvent::PageExtracted { page, .. } => Some(*page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 2]);
    }
}
