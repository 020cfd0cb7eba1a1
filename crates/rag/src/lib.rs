//! Retrieval for the dispatch server
//!
//! Features:
//! - Similarity search scoped to a per-tenant namespace
//! - Cross-encoder reranking of the candidates
//! - Pinecone REST backend (integrated embedding + hosted rerank)
//! - In-memory keyword backend for development and tests
//! - A pipeline that bounds the round trip and renders the agent-facing reply

pub mod backend;
pub mod memory;
pub mod pinecone;
pub mod pipeline;
pub mod scorer;

pub use backend::{RerankOptions, SearchHit, VectorBackend};
pub use memory::{InMemoryBackend, SeedDocument, SeedFile};
pub use pinecone::{PineconeBackend, PineconeConfig};
pub use pipeline::{PipelineConfig, RetrievalPipeline, SearchNamespace};
pub use scorer::KeywordScorer;

use concierge_core::DispatchError;
use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Reranker error: {0}")]
    Reranker(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RagError> for DispatchError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Timeout(ms) => DispatchError::BackendTimeout(ms),
            RagError::Auth(msg) => DispatchError::BackendAuth(msg),
            RagError::MalformedResponse(msg) => DispatchError::MalformedResponse(msg),
            RagError::Configuration(msg) | RagError::Index(msg) => {
                DispatchError::Configuration(msg)
            }
            RagError::Search(_) | RagError::Reranker(_) | RagError::Connection(_) => {
                DispatchError::BackendUnavailable(err.to_string())
            }
        }
    }
}
