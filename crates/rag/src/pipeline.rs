//! Retrieval pipeline
//!
//! Resolves the namespace for a call, runs search then rerank under one
//! timeout, and renders the agent-facing reply. Failures never escape as
//! errors from [`RetrievalPipeline::retrieve`]; they become a
//! [`RetrievalOutcome::Failed`] so the tool always has text to return.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use concierge_config::{BackendKind, RetrievalConfig};
use concierge_core::{ResolvedContext, RetrievalOutcome};

use crate::backend::{RerankOptions, SearchHit, VectorBackend};
use crate::memory::InMemoryBackend;
use crate::pinecone::{PineconeBackend, PineconeConfig};
use crate::RagError;

/// Namespace chosen for a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNamespace {
    pub name: String,
    /// True when no tenant resolved and the default was used
    pub is_default: bool,
}

impl SearchNamespace {
    /// Tenant id when present, otherwise the configured default
    pub fn for_context(context: &ResolvedContext, default_namespace: &str) -> Self {
        match context.tenant_id.as_deref() {
            Some(tenant) => Self {
                name: tenant.to_string(),
                is_default: false,
            },
            None => Self {
                name: default_namespace.to_string(),
                is_default: true,
            },
        }
    }
}

/// Pipeline parameters
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_namespace: String,
    pub top_k: usize,
    pub rerank: RerankOptions,
    /// Bound on the whole search + rerank round trip
    pub timeout: Duration,
}

impl From<&RetrievalConfig> for PipelineConfig {
    fn from(settings: &RetrievalConfig) -> Self {
        Self {
            default_namespace: settings.default_namespace.clone(),
            top_k: settings.top_k,
            rerank: RerankOptions {
                model: settings.rerank_model.clone(),
                top_n: settings.top_n,
                rank_fields: settings.rank_fields.clone(),
            },
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

/// Search + rerank over a vector backend
pub struct RetrievalPipeline {
    backend: Arc<dyn VectorBackend>,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    pub fn new(backend: Arc<dyn VectorBackend>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    /// Build the configured backend and wrap it
    pub fn from_settings(settings: &RetrievalConfig) -> Result<Self, RagError> {
        let backend: Arc<dyn VectorBackend> = match settings.backend {
            BackendKind::Pinecone => {
                Arc::new(PineconeBackend::new(PineconeConfig::from_settings(settings)?)?)
            }
            BackendKind::Memory => match settings.seed_path.as_deref() {
                Some(path) => Arc::new(InMemoryBackend::from_seed_file(Path::new(path))?),
                None => Arc::new(InMemoryBackend::new()),
            },
        };

        tracing::info!(
            backend = backend.name(),
            default_namespace = %settings.default_namespace,
            top_k = settings.top_k,
            top_n = settings.top_n,
            "Retrieval pipeline ready"
        );

        Ok(Self::new(backend, PipelineConfig::from(settings)))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn namespace_for(&self, context: &ResolvedContext) -> SearchNamespace {
        SearchNamespace::for_context(context, &self.config.default_namespace)
    }

    /// Reranked hits for the cleaned query, best first, at most `top_n`
    pub async fn search(&self, context: &ResolvedContext) -> Result<Vec<SearchHit>, RagError> {
        let namespace = self.namespace_for(context);
        let query = context.clean_query.as_str();

        if query.trim().is_empty() {
            tracing::debug!(namespace = %namespace.name, "Empty query after tag removal");
            return Ok(Vec::new());
        }

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let round_trip = async {
            let candidates = self
                .backend
                .search(&namespace.name, query, self.config.top_k)
                .await?;
            if candidates.is_empty() {
                return Ok(candidates);
            }

            let mut hits = self
                .backend
                .rerank(query, candidates, &self.config.rerank)
                .await?;
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(self.config.rerank.top_n);
            Ok(hits)
        };

        tokio::time::timeout(self.config.timeout, round_trip)
            .await
            .map_err(|_| RagError::Timeout(timeout_ms))?
    }

    /// Run retrieval and render the outcome
    pub async fn retrieve(&self, context: &ResolvedContext) -> RetrievalOutcome {
        let start = Instant::now();
        let namespace = self.namespace_for(context);

        let outcome = match self.search(context).await {
            Ok(hits) if hits.is_empty() => RetrievalOutcome::NothingFound,
            Ok(hits) => RetrievalOutcome::Found {
                hits: hits.len(),
                body: hits
                    .iter()
                    .map(SearchHit::to_json_line)
                    .collect::<Vec<_>>()
                    .join("\n"),
            },
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    namespace = %namespace.name,
                    error = %e,
                    "Retrieval failed"
                );
                RetrievalOutcome::Failed {
                    backend: self.backend.name().to_string(),
                    error: e.into(),
                }
            }
        };

        tracing::info!(
            backend = self.backend.name(),
            namespace = %namespace.name,
            default_namespace = namespace.is_default,
            outcome = outcome.label(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Retrieval complete"
        );

        outcome
    }
}
