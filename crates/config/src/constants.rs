//! Centralized constants for the dispatch server
//!
//! Single source of truth for defaults shared by settings, the retrieval
//! pipeline and the form router.

/// Service endpoints
pub mod endpoints {
    /// Pinecone inference API (hosts the rerank endpoint)
    pub const PINECONE_INFERENCE_DEFAULT: &str = "https://api.pinecone.io";

    /// Pinecone REST API version header value
    pub const PINECONE_API_VERSION: &str = "2025-01";
}

/// Retrieval defaults
pub mod retrieval {
    /// Namespace used when no tenant resolved
    pub const DEFAULT_NAMESPACE: &str = "hr4s";

    /// Candidates requested from similarity search
    pub const SEARCH_TOP_K: usize = 7;

    /// Hits kept after reranking
    pub const RERANK_TOP_N: usize = 5;

    /// Cross-encoder used for reranking
    pub const RERANK_MODEL: &str = "bge-reranker-v2-m3";

    /// Document field the reranker reads
    pub const RANK_FIELD: &str = "text";

    /// Upper bound for one search + rerank round trip
    pub const TIMEOUT_MS: u64 = 10_000;
}

/// Tool execution
pub mod tools {
    /// Per-tool timeout enforced by the registry (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// HTTP server
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8080;
}
