//! Fetch and throttle configuration
//!
//! Carries the design constants in one place. The defaults mirror the remote
//! service's published limits, erring toward fewer requests: entries are
//! reused for two full days against a "once per day" guidance, transfers are
//! spaced two seconds apart, and bursts are capped at two per four-second
//! window with a one-second safety margin.

use std::time::Duration;

/// Configuration for the fetcher and its throttle gates
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum age of a cached entry that is still served without a transfer
    pub max_age: Duration,
    /// Minimum gap between the end of one transfer and the start of the next
    pub min_gap: Duration,
    /// Number of transfers admitted per trailing window
    pub window_capacity: usize,
    /// Duration of the trailing admission window
    pub window: Duration,
    /// Safety margin added when waiting out a full window
    pub window_margin: Duration,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(48 * 3600),
            min_gap: Duration::from_millis(2000),
            window_capacity: 2,
            window: Duration::from_millis(4000),
            window_margin: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_service_limits() {
        let config = FetchConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(48 * 3600));
        assert_eq!(config.min_gap, Duration::from_millis(2000));
        assert_eq!(config.window_capacity, 2);
        assert_eq!(config.window, Duration::from_millis(4000));
        assert_eq!(config.window_margin, Duration::from_millis(1000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_fields_are_overridable() {
        let config = FetchConfig {
            max_age: Duration::from_secs(3600),
            ..FetchConfig::default()
        };
        assert_eq!(config.max_age, Duration::from_secs(3600));
        assert_eq!(config.min_gap, Duration::from_millis(2000));
    }
}
