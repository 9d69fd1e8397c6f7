//! `[server]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:8080/matchboxv3/fhir"   # FHIR base of the mapping server
//! timeout_ms = 30000                                    # Per-request timeout
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigError;

/// Remote mapping server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// FHIR base url; `StructureMap` endpoints hang off it.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/matchboxv3/fhir".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed base url, http(s) only.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::validation("server.base_url", format!("{}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation(
                "server.base_url",
                format!("unsupported scheme `{}`, expected http or https", url.scheme()),
            ));
        }
        Ok(url)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::validation("server.timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }
}
