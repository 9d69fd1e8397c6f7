//! `[pipeline]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pipeline]
//! quiet_interval_ms = 1000   # Delay before a burst of edits is considered settled
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Debounce settings shared by both buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delay before a burst of edits is considered settled.
    pub quiet_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quiet_interval_ms: 1000,
        }
    }
}

impl PipelineConfig {
    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.quiet_interval_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.quiet_interval_ms == 0 {
            return Err(ConfigError::validation(
                "pipeline.quiet_interval_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_pipeline_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.pipeline.quiet_interval().as_millis(), 1000);
    }

    #[test]
    fn test_pipeline_config_override() {
        let config = test_parse_config("[pipeline]\nquiet_interval_ms = 250");
        assert_eq!(config.pipeline.quiet_interval_ms, 250);
        assert!(config.pipeline.validate().is_ok());
    }

    #[test]
    fn test_pipeline_config_rejects_zero() {
        let config = test_parse_config("[pipeline]\nquiet_interval_ms = 0");
        assert!(config.pipeline.validate().is_err());
    }
}
