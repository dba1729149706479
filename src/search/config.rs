//! Search pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{SearchError, SearchResult};

/// Search pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period the query text must be stable for before it is processed
    /// (default: 500ms)
    pub debounce_ms: u64,

    /// Simulated cost of a non-blank search, applied by the in-memory
    /// backend (default: 500ms)
    pub processing_delay_ms: u64,

    /// Buffer size of the failure side-channel
    pub failure_channel_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            processing_delay_ms: 500,
            failure_channel_capacity: 16,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    /// Worst-case latency between the last keystroke and a published result
    pub fn worst_case_latency(&self) -> Duration {
        self.debounce() + self.processing_delay()
    }

    /// Validate the configuration
    pub fn validate(&self) -> SearchResult<()> {
        if self.failure_channel_capacity == 0 {
            return Err(SearchError::InvalidConfiguration(
                "failure_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn processing_delay_ms(mut self, ms: u64) -> Self {
        self.config.processing_delay_ms = ms;
        self
    }

    pub fn failure_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.failure_channel_capacity = capacity;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.processing_delay(), Duration::from_millis(500));
        assert_eq!(config.worst_case_latency(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfigBuilder::new()
            .debounce_ms(250)
            .processing_delay_ms(0)
            .failure_channel_capacity(4)
            .build();

        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.processing_delay_ms, 0);
        assert_eq!(config.failure_channel_capacity, 4);
    }

    #[test]
    fn test_zero_failure_capacity_is_rejected() {
        let config = SearchConfigBuilder::new().failure_channel_capacity(0).build();
        assert!(matches!(
            config.validate(),
            Err(SearchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"debounce_ms": 100}"#).unwrap();
        assert_eq!(config.debounce_ms, 100);
        assert_eq!(config.processing_delay_ms, 500);
    }
}
