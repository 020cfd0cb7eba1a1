//! Tool requests and resolved call context

use serde::{Deserialize, Serialize};

use crate::context::{extract_context, EmbeddedContext};
use crate::tenant::{resolve_tenant_with_source, TenantSource};

/// Sentinel session id used when nothing upstream identified the session
pub const FALLBACK_SESSION_ID: &str = "fallback-session-id";

/// A single tool invocation as received from the agent runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Free-text query, possibly carrying embedded metadata tags
    pub raw_query: String,
    /// Session id passed as a separate argument
    pub explicit_session_id: Option<String>,
    /// Tenant id passed as a separate argument
    pub explicit_tenant_id: Option<String>,
}

impl ToolRequest {
    pub fn new(raw_query: impl Into<String>) -> Self {
        Self {
            raw_query: raw_query.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.explicit_session_id = Some(session_id.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.explicit_tenant_id = Some(tenant_id.into());
        self
    }
}

/// What to do when no session id can be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionFallback {
    /// Every anonymous call shares one sentinel id
    Shared {
        #[serde(default = "default_sentinel")]
        sentinel: String,
    },
    /// Each anonymous call gets a fresh UUID
    Generate,
}

fn default_sentinel() -> String {
    FALLBACK_SESSION_ID.to_string()
}

impl Default for SessionFallback {
    fn default() -> Self {
        Self::Shared {
            sentinel: default_sentinel(),
        }
    }
}

impl SessionFallback {
    /// Produce a session id for a call that has none
    pub fn session_id(&self) -> String {
        match self {
            Self::Shared { sentinel } => sentinel.clone(),
            Self::Generate => uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Where the resolved session id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    Tag,
    Explicit,
    Fallback,
}

impl SessionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Explicit => "explicit",
            Self::Fallback => "fallback",
        }
    }
}

/// Context a tool dispatches on, fully defaulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContext {
    /// Always present; see [`SessionFallback`]
    pub session_id: String,
    /// Final tenant id, `None` means the default namespace
    pub tenant_id: Option<String>,
    /// Query text with metadata tags removed
    pub clean_query: String,
    /// Provenance of `session_id`
    pub session_source: SessionSource,
    /// Provenance of `tenant_id`
    pub tenant_source: TenantSource,
}

impl ResolvedContext {
    /// Resolve a request: extract tags, pick the tenant, default the session.
    ///
    /// Tag values take precedence over explicit arguments for both session
    /// and tenant.
    pub fn resolve(request: &ToolRequest, fallback: &SessionFallback) -> Self {
        let embedded = extract_context(&request.raw_query);
        Self::from_embedded(embedded, request, fallback)
    }

    fn from_embedded(
        embedded: EmbeddedContext,
        request: &ToolRequest,
        fallback: &SessionFallback,
    ) -> Self {
        let (tenant_id, tenant_source) = resolve_tenant_with_source(
            embedded.bot_id.as_deref(),
            request.explicit_tenant_id.as_deref(),
            embedded.path.as_deref(),
        );

        let explicit_session = request
            .explicit_session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (session_id, session_source) = match (embedded.session_id, explicit_session) {
            (Some(tagged), _) => (tagged, SessionSource::Tag),
            (None, Some(explicit)) => (explicit.to_string(), SessionSource::Explicit),
            (None, None) => (fallback.session_id(), SessionSource::Fallback),
        };

        Self {
            session_id,
            tenant_id,
            clean_query: embedded.clean_message,
            session_source,
            tenant_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_win_over_explicit() {
        let request = ToolRequest::new("[SESSION_ID: s1] [BOT_ID: fp01] book me in")
            .with_session_id("explicit-session")
            .with_tenant_id("explicit-tenant");
        let ctx = ResolvedContext::resolve(&request, &SessionFallback::default());

        assert_eq!(ctx.session_id, "s1");
        assert_eq!(ctx.session_source, SessionSource::Tag);
        assert_eq!(ctx.tenant_id.as_deref(), Some("fp01"));
        assert_eq!(ctx.tenant_source, TenantSource::Tag);
        assert_eq!(ctx.clean_query, "book me in");
    }

    #[test]
    fn test_explicit_values_used_without_tags() {
        let request = ToolRequest::new("book me in")
            .with_session_id("s9")
            .with_tenant_id("acme");
        let ctx = ResolvedContext::resolve(&request, &SessionFallback::default());

        assert_eq!(ctx.session_id, "s9");
        assert_eq!(ctx.session_source, SessionSource::Explicit);
        assert_eq!(ctx.tenant_id.as_deref(), Some("acme"));
        assert_eq!(ctx.clean_query, "book me in");
    }

    #[test]
    fn test_explicit_tenant_beats_path() {
        let request = ToolRequest::new("[PATH: e1/acme/Xyz] hi").with_tenant_id("explicit");
        let ctx = ResolvedContext::resolve(&request, &SessionFallback::default());
        assert_eq!(ctx.tenant_id.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_path_tenant() {
        let ctx = ResolvedContext::resolve(
            &ToolRequest::new("[PATH: e1/acme/Xyz] find hours"),
            &SessionFallback::default(),
        );
        assert_eq!(ctx.tenant_id.as_deref(), Some("Xyz"));
        assert_eq!(ctx.tenant_source, TenantSource::Path);
        assert_eq!(ctx.clean_query, "find hours");
    }

    #[test]
    fn test_shared_fallback_session() {
        let ctx = ResolvedContext::resolve(&ToolRequest::new("hello"), &SessionFallback::default());
        assert_eq!(ctx.session_id, FALLBACK_SESSION_ID);
        assert_eq!(ctx.session_source, SessionSource::Fallback);
        assert_eq!(ctx.tenant_id, None);
    }

    #[test]
    fn test_blank_explicit_session_falls_back() {
        let request = ToolRequest::new("hello").with_session_id("   ");
        let ctx = ResolvedContext::resolve(&request, &SessionFallback::default());
        assert_eq!(ctx.session_id, FALLBACK_SESSION_ID);
    }

    #[test]
    fn test_generated_fallback_sessions_are_distinct() {
        let request = ToolRequest::new("hello");
        let a = ResolvedContext::resolve(&request, &SessionFallback::Generate);
        let b = ResolvedContext::resolve(&request, &SessionFallback::Generate);
        assert_ne!(a.session_id, b.session_id);
        assert!(uuid::Uuid::parse_str(&a.session_id).is_ok());
    }

    #[test]
    fn test_fallback_deserializes_from_config_shape() {
        let shared: SessionFallback =
            serde_json::from_str(r#"{"mode":"shared","sentinel":"anon"}"#).unwrap();
        assert_eq!(shared.session_id(), "anon");

        let defaulted: SessionFallback = serde_json::from_str(r#"{"mode":"shared"}"#).unwrap();
        assert_eq!(defaulted.session_id(), FALLBACK_SESSION_ID);

        let generate: SessionFallback = serde_json::from_str(r#"{"mode":"generate"}"#).unwrap();
        assert_eq!(generate, SessionFallback::Generate);
    }
}
