//! Application State
//!
//! Shared, read-only state across all handlers and transports.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

use concierge_config::Settings;
use concierge_rag::RetrievalPipeline;
use concierge_tools::{create_registry, ToolRegistry};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub tools: Arc<ToolRegistry>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub started_at: Instant,
}

impl AppState {
    /// Build the retrieval pipeline and tool registry from settings
    pub fn from_settings(config: Settings) -> Result<Self, ServerError> {
        let pipeline = RetrievalPipeline::from_settings(&config.retrieval)?;
        let registry = create_registry(
            config.forms.clone(),
            Arc::new(pipeline),
            config.session.fallback.clone(),
        );
        Ok(Self::with_registry(config, registry))
    }

    /// State around an already-built registry
    pub fn with_registry(config: Settings, tools: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            tools: Arc::new(tools),
            metrics: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
