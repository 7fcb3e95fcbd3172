use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and bounds of a paginated harvest.
///
/// Durations are stored in milliseconds so the configuration can be passed
/// around as JSON (tool parameters, CLI flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PaginationConfig {
    /// Fixed wait after clicking a page control, before watching the table (default: 2000)
    pub settle_delay_ms: u64,

    /// Interval between two table content checks (default: 100)
    pub poll_interval_ms: u64,

    /// How long to watch for a table change before moving on anyway (default: 1000)
    pub stabilization_timeout_ms: u64,

    /// Extra wait once a change was seen, to let rendering finish (default: 500)
    pub grace_delay_ms: u64,

    /// Stop after this many pages even if more exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 2000,
            poll_interval_ms: 100,
            stabilization_timeout_ms: 1000,
            grace_delay_ms: 500,
            max_pages: None,
        }
    }
}

impl PaginationConfig {
    /// Create a configuration with default timings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every wait set to zero, for simulated pages
    pub fn immediate() -> Self {
        Self {
            settle_delay_ms: 0,
            poll_interval_ms: 1,
            stabilization_timeout_ms: 5,
            grace_delay_ms: 0,
            max_pages: None,
        }
    }

    /// Builder method: set the settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = duration_ms(delay);
        self
    }

    /// Builder method: set the poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_ms(interval);
        self
    }

    /// Builder method: set the stabilization ceiling
    pub fn stabilization_timeout(mut self, timeout: Duration) -> Self {
        self.stabilization_timeout_ms = duration_ms(timeout);
        self
    }

    /// Builder method: set the grace delay
    pub fn grace_delay(mut self, delay: Duration) -> Self {
        self.grace_delay_ms = duration_ms(delay);
        self
    }

    /// Builder method: cap the number of pages
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn settle_delay_duration(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Poll interval, never zero so that polling always makes progress
    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn stabilization_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.stabilization_timeout_ms)
    }

    pub fn grace_delay_duration(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PaginationConfig::default();
        assert_eq!(config.settle_delay_duration(), Duration::from_millis(2000));
        assert_eq!(config.poll_interval_duration(), Duration::from_millis(100));
        assert_eq!(config.stabilization_timeout_duration(), Duration::from_millis(1000));
        assert_eq!(config.grace_delay_duration(), Duration::from_millis(500));
        assert_eq!(config.max_pages, None);
    }

    #[test]
    fn test_builder() {
        let config = PaginationConfig::new()
            .settle_delay(Duration::from_millis(10))
            .poll_interval(Duration::from_millis(5))
            .stabilization_timeout(Duration::from_secs(3))
            .grace_delay(Duration::ZERO)
            .max_pages(4);

        assert_eq!(config.settle_delay_ms, 10);
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.stabilization_timeout_ms, 3000);
        assert_eq!(config.grace_delay_ms, 0);
        assert_eq!(config.max_pages, Some(4));
    }

    #[test]
    fn test_zero_poll_interval_clamped() {
        let config = PaginationConfig::new().poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval_duration(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PaginationConfig = serde_json::from_value(serde_json::json!({
            "settle_delay_ms": 250,
            "max_pages": 2
        }))
        .unwrap();

        assert_eq!(config.settle_delay_ms, 250);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.max_pages, Some(2));
    }
}
