//! Dispatch errors
//!
//! Faults that can occur while serving a tool call. Tools never surface
//! these to the agent runtime directly; the tool adapter renders them into
//! the failure payload. Keeping the kinds separate lets callers and tests
//! tell a timeout from a bad credential from a broken config.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("backend timed out after {0} ms")]
    BackendTimeout(u64),

    #[error("backend rejected credentials: {0}")]
    BackendAuth(String),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DispatchError {
    /// Stable kind label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendTimeout(_) => "timeout",
            Self::BackendAuth(_) => "auth",
            Self::MalformedResponse(_) => "malformed_response",
            Self::BackendUnavailable(_) => "unavailable",
            Self::Configuration(_) => "configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
