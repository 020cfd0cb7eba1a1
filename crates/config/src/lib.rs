//! Configuration management for the dispatch server
//!
//! Supports loading configuration from:
//! - YAML files under `config/` (`default.yaml`, then `{env}.yaml`)
//! - Environment variables (CONCIERGE__ prefix, `__` as the section separator)
//!
//! The tenant -> form template table and the retrieval defaults are read
//! once at start-up and shared read-only for the life of the process.

pub mod constants;
pub mod forms;
pub mod settings;

pub use forms::{BookFormsConfig, FormTarget, FormsConfig, TenantForm};
pub use settings::{
    load_settings, load_settings_from, AuthConfig, BackendKind, ObservabilityConfig,
    RetrievalConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings, Transport,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
