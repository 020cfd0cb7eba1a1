//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use concierge_core::SessionFallback;

use crate::constants::{endpoints, retrieval, server};
use crate::{ConfigError, FormsConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Session fallback policy
    #[serde(default)]
    pub session: SessionConfig,

    /// Appointment form templates
    #[serde(default)]
    pub forms: FormsConfig,

    /// Retrieval backend and pipeline tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.forms.validate()?;
        self.validate_retrieval()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;

        if r.top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_n".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if r.top_n > r.top_k {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_n".to_string(),
                message: format!(
                    "Cannot exceed retrieval.top_k ({}), got {}",
                    r.top_k, r.top_n
                ),
            });
        }

        if r.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.timeout_ms".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        if r.rank_fields.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.rank_fields".to_string(),
                message: "At least one rank field is required".to_string(),
            });
        }

        if r.default_namespace.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "retrieval.default_namespace".to_string(),
            ));
        }

        if r.backend == BackendKind::Pinecone {
            if r.index_host.as_deref().map_or(true, |h| h.trim().is_empty()) {
                return Err(ConfigError::MissingField("retrieval.index_host".to_string()));
            }
            if r.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                return Err(ConfigError::MissingField("retrieval.api_key".to_string()));
            }
        }

        if r.backend == BackendKind::Memory && self.environment.is_strict() {
            tracing::warn!(
                environment = ?self.environment,
                "In-memory retrieval backend configured outside development"
            );
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let s = &self.server;

        if s.transport == Transport::Http && s.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if s.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        if s.auth.enabled && s.auth.api_key.as_deref().map_or(true, str::is_empty) {
            if self.environment.is_production() {
                return Err(ConfigError::MissingField("server.auth.api_key".to_string()));
            }
            tracing::warn!("server.auth is enabled without an api_key; every request will be rejected");
        }

        Ok(())
    }
}

/// How the agent runtime reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC and REST over HTTP
    #[default]
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub transport: Transport,

    /// Request timeout applied by the HTTP layer
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed origins; empty means localhost only
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    server::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    server::DEFAULT_PORT
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            transport: Transport::default(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Bearer token authentication for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Set via CONCIERGE__SERVER__AUTH__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Path prefixes that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/metrics".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder and serve /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Session handling
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub fallback: SessionFallback,
}

/// Which vector backend serves retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pinecone integrated-embedding index
    Pinecone,
    /// Process-local keyword index, for development and tests
    #[default]
    Memory,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Index data-plane host, e.g. `https://my-index-abc123.svc.pinecone.io`
    #[serde(default)]
    pub index_host: Option<String>,

    /// Inference host serving `/rerank`
    #[serde(default = "default_inference_host")]
    pub inference_host: String,

    /// Falls back to the PINECONE_API_KEY environment variable
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Namespace for calls with no tenant
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Candidates requested from similarity search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Hits kept after reranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Fields the reranker reads
    #[serde(default = "default_rank_fields")]
    pub rank_fields: Vec<String>,

    #[serde(default = "default_rerank_model")]
    pub rerank_model: String,

    /// Bound on one search + rerank round trip
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_ms: u64,

    /// YAML file of documents preloaded into the in-memory backend
    #[serde(default)]
    pub seed_path: Option<String>,
}

fn default_inference_host() -> String {
    endpoints::PINECONE_INFERENCE_DEFAULT.to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var("PINECONE_API_KEY").ok().filter(|k| !k.is_empty())
}
fn default_api_version() -> String {
    endpoints::PINECONE_API_VERSION.to_string()
}
fn default_namespace() -> String {
    retrieval::DEFAULT_NAMESPACE.to_string()
}
fn default_top_k() -> usize {
    retrieval::SEARCH_TOP_K
}
fn default_top_n() -> usize {
    retrieval::RERANK_TOP_N
}
fn default_rank_fields() -> Vec<String> {
    vec![retrieval::RANK_FIELD.to_string()]
}
fn default_rerank_model() -> String {
    retrieval::RERANK_MODEL.to_string()
}
fn default_retrieval_timeout() -> u64 {
    retrieval::TIMEOUT_MS
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            index_host: None,
            inference_host: default_inference_host(),
            api_key: default_api_key(),
            api_version: default_api_version(),
            default_namespace: default_namespace(),
            top_k: default_top_k(),
            top_n: default_top_n(),
            rank_fields: default_rank_fields(),
            rerank_model: default_rerank_model(),
            timeout_ms: default_retrieval_timeout(),
            seed_path: None,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CONCIERGE__ prefix, `__` separator)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
