//! Concierge Server
//!
//! Serves the dispatch tools over MCP JSON-RPC, either as an HTTP service
//! (axum) or over stdin/stdout for agent runtimes that spawn the server as
//! a subprocess.

pub mod auth;
pub mod http;
pub mod mcp_server;
pub mod metrics;
pub mod state;
pub mod stdio;

pub use auth::auth_middleware;
pub use http::create_router;
pub use mcp_server::{execute_tool, handle_line, handle_rpc};
pub use metrics::{init_metrics, record_tool_call};
pub use state::AppState;
pub use stdio::{run_stdio, serve_lines};

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] concierge_config::ConfigError),

    #[error("Retrieval setup failed: {0}")]
    Retrieval(#[from] concierge_rag::RagError),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
