//! Core types for tenant-aware tool dispatch
//!
//! This crate holds everything that is pure and backend-free:
//! - Embedded metadata extraction (`[SESSION_ID: ...]`, `[PATH: ...]`, `[BOT_ID: ...]`)
//! - Tenant resolution with tag / explicit / path precedence
//! - Request and resolved-context types, including session fallback policy
//! - Response payloads and the dispatch error taxonomy

pub mod context;
pub mod error;
pub mod request;
pub mod response;
pub mod tenant;

pub use context::{extract_context, has_embedded_context, EmbeddedContext, MetadataKey};
pub use error::{DispatchError, Result};
pub use request::{
    ResolvedContext, SessionFallback, SessionSource, ToolRequest, FALLBACK_SESSION_ID,
};
pub use response::{
    FormIntent, FormResponse, RetrievalOutcome, NOTHING_FOUND_MESSAGE, RESULTS_PREFIX,
};
pub use tenant::{resolve_tenant, resolve_tenant_with_source, tenant_from_path, TenantSource};
