//! Configuration Loader
//!
//! Environment-aware loading: defaults, base file, per-environment file and
//! environment variables merged through the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::AgentConfig;
use crate::constants::ENV_PREFIX;
use crate::logging::get_environment;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_CONFIG_NAME: &str = "agent";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: AgentConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = get_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    ///
    /// An explicitly given directory must exist; the default `config`
    /// directory may be absent.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let explicit = config_dir.is_some();
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));
        if explicit && !config_directory.is_dir() {
            return Err(ConfigurationError::directory_not_found(config_directory));
        }

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = %environment,
            config_dir = %config_directory.display(),
            max_retries = config.connectivity.max_retries,
            registration_timeout_ms = config.registration.timeout_ms,
            "⚙️ Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: AgentConfig, environment: &str) -> ConfigResult<ConfigManager> {
        config.validate()?;
        Ok(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: PathBuf::from("config"),
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn load_and_merge_config(config_directory: &Path, environment: &str) -> ConfigResult<AgentConfig> {
        let base_file = config_directory.join(format!("{BASE_CONFIG_NAME}.toml"));
        let env_file = config_directory.join(format!("{BASE_CONFIG_NAME}.{environment}.toml"));

        for file in [&base_file, &env_file] {
            if file.exists() {
                debug!("Applying configuration file: {}", file.display());
            }
        }

        let merged = Config::builder()
            .add_source(Config::try_from(&AgentConfig::default())?)
            .add_source(File::from(base_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(merged.try_deserialize::<AgentConfig>()?)
    }
}
