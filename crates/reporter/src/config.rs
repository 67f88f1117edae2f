//! Reporter configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the startup reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// How long to wait for the start level service (default: 5s)
    pub tier_service_timeout: Duration,
    /// How long to wait for the optional configuration registry (default: 100ms)
    pub configuration_registry_timeout: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            tier_service_timeout: Duration::from_millis(5000),
            configuration_registry_timeout: Duration::from_millis(100),
        }
    }
}
