//! # Agent Configuration
//!
//! Layered configuration for the device agent. Sources are applied in order,
//! later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`AgentConfig::default`])
//! 2. `<config_dir>/agent.toml`
//! 3. `<config_dir>/agent.<environment>.toml`
//! 4. `DEVICE_AGENT__<SECTION>__<KEY>` environment variables
//!
//! Missing files are skipped; the defaults alone describe a working agent.
//!
//! ```rust,no_run
//! use device_agent::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let retries = manager.config().connectivity.max_retries;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{network, DEFAULT_BLINK_PATTERN, DEFAULT_MOUNT_POINT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Network connect policy
    pub connectivity: ConnectivityConfig,

    /// Registration behaviour
    pub registration: RegistrationConfig,

    /// Reference resource set
    pub resources: ResourcesConfig,

    /// Storage handed to the management client
    pub storage: StorageConfig,

    /// Simulated collaborators used by the binary
    pub simulation: SimulationConfig,
}

/// Connect retry policy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Transient failures tolerated before giving up
    pub max_retries: u32,
    /// Delay before the first retry. Zero retries immediately.
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            max_retries: network::DEFAULT_MAX_RETRIES,
            initial_backoff_ms: 0,
            backoff_multiplier: 2.0,
            max_backoff_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Give up when no acknowledgment arrives within this many milliseconds.
    /// Zero waits forever.
    pub timeout_ms: u64,
}

impl RegistrationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Period of the simulated button press. Zero disables it.
    pub button_interval_ms: u64,
    /// Initial value of the blink pattern resource
    pub initial_blink_pattern: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            button_interval_ms: 5_000,
            initial_blink_pattern: DEFAULT_BLINK_PATTERN.to_string(),
        }
    }
}

impl ResourcesConfig {
    pub fn button_interval(&self) -> Option<Duration> {
        (self.button_interval_ms > 0).then(|| Duration::from_millis(self.button_interval_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub mount_point: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
        }
    }
}

/// Behaviour of the simulated link and client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Transient connect failures before the link comes up
    pub transient_failures: u32,
    /// Reject the credentials on every attempt
    pub auth_failure: bool,
    /// Fail management client initialization
    pub client_init_failure: bool,
    /// Delay before the simulated service acknowledges registration
    pub registration_delay_ms: u64,
    pub endpoint_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            transient_failures: 0,
            auth_failure: false,
            client_init_failure: false,
            registration_delay_ms: 250,
            endpoint_name: "simulated-device".to_string(),
        }
    }
}

impl AgentConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let connectivity = &self.connectivity;
        if !connectivity.backoff_multiplier.is_finite() || connectivity.backoff_multiplier < 1.0 {
            return Err(ConfigurationError::invalid_value(
                "connectivity.backoff_multiplier",
                connectivity.backoff_multiplier.to_string(),
                "multiplier must be a finite number of at least 1.0",
            ));
        }

        if connectivity.max_backoff_ms < connectivity.initial_backoff_ms {
            return Err(ConfigurationError::invalid_value(
                "connectivity.max_backoff_ms",
                connectivity.max_backoff_ms.to_string(),
                "max backoff must not be below the initial backoff",
            ));
        }

        if self.storage.mount_point.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "storage.mount_point",
                "storage configuration",
            ));
        }

        if self.simulation.endpoint_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "simulation.endpoint_name",
                "simulation configuration",
            ));
        }

        Ok(())
    }
}
