//! Application configuration, layered on top of [`gatekeeper_core::AdmissionConfig`].
//!
//! This is based on [config], a layered configuration system for Rust applications (with strong
//! support for 12-factor applications).
//!
//! # Layers
//!
//! Upper layers overwrite lower layer configuration.
//!
//! ## Layer 1 (Environment variables) \[optional\]
//!
//! Environment variables are the top layer. They can overwrite any previous configuration and
//! have the format `[ENV_PREFIX]_[field]_[sub_field]`, where `ENV_PREFIX` defaults to
//! `GATEKEEPER`. The nested field `admission.attack_detector.max_polls` can then be overwritten by
//! `GATEKEEPER_ADMISSION_ATTACK_DETECTOR_MAX_POLLS`.
//!
//! ## Layer 2 (Custom configuration) \[optional\]
//!
//! An optional configuration file intended for deployments and local testing. Its location is
//! configured using the `CONFIG_FILE` environment variable, defaulting to `config/config`. It can
//! be of any file type supported by [config] (e.g. `config/config.toml`).
//!
//! ## Layer 3 (Default configuration)
//!
//! The default configuration provides default values for every field, defined by the
//! [`Default`] impls on [`gatekeeper_core::AdmissionConfig`] and its sub-configs.
//!
//! # Usage
//!
//! ```rs
//! let config = Config::read()?;
//! ```

#![allow(clippy::derivable_impls)]

use config::{ConfigError, Environment, File};
use gatekeeper_core::AdmissionConfig;
use serde::Deserialize;
use std::env;

const DEFAULT_ENV_PREFIX: &str = "GATEKEEPER";
const DEFAULT_CONFIG_FILE: &str = "config/config";

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub admission: AdmissionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admission: AdmissionConfig::default(),
        }
    }
}

impl Config {
    /// Reads and layers the configuration from the environment, an optional config file, and the
    /// built-in defaults, in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is present but cannot be parsed, or if any source
    /// cannot be deserialized into [`Config`].
    pub fn read() -> Result<Self, ConfigError> {
        let env_prefix = env::var("ENV_PREFIX").unwrap_or_else(|_| DEFAULT_ENV_PREFIX.into());
        let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());

        let s = config::Config::builder()
            .add_source(File::with_name(&config_file).required(false))
            .add_source(Environment::with_prefix(&env_prefix).separator("_"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_admission_defaults() {
        let config = Config::default();
        assert_eq!(
            config.admission.queue.max_polls,
            AdmissionConfig::default().queue.max_polls
        );
    }
}
