//! Tenant Resolution
//!
//! Decides which tenant (bot) a call belongs to. Precedence:
//! 1. `[BOT_ID: ...]` tag embedded in the query
//! 2. Explicit tenant id supplied by the caller
//! 3. Last segment of an embedded `[PATH: ...]` tag
//! 4. None (callers fall back to their default namespace)

use serde::{Deserialize, Serialize};

/// Where the resolved tenant id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantSource {
    Tag,
    Explicit,
    Path,
    Default,
}

impl TenantSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Explicit => "explicit",
            Self::Path => "path",
            Self::Default => "default",
        }
    }
}

/// Derive a tenant id from a request path such as `e1/burneteyecarepinecone/QApixW`.
///
/// Leading and trailing slashes are ignored and the last non-empty segment
/// wins. An empty or missing path yields an empty string.
pub fn tenant_from_path(path: Option<&str>) -> String {
    path.map(|p| p.trim_matches('/'))
        .and_then(|p| p.rsplit('/').find(|segment| !segment.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// Resolve the final tenant id, reporting which input supplied it.
///
/// Empty strings are treated as absent at every level.
pub fn resolve_tenant_with_source(
    tag_tenant: Option<&str>,
    explicit_tenant: Option<&str>,
    path: Option<&str>,
) -> (Option<String>, TenantSource) {
    if let Some(tenant) = non_empty(tag_tenant) {
        return (Some(tenant.to_string()), TenantSource::Tag);
    }
    if let Some(tenant) = non_empty(explicit_tenant) {
        return (Some(tenant.to_string()), TenantSource::Explicit);
    }
    let from_path = tenant_from_path(path);
    if !from_path.is_empty() {
        return (Some(from_path), TenantSource::Path);
    }
    (None, TenantSource::Default)
}

/// Resolve the final tenant id
pub fn resolve_tenant(
    tag_tenant: Option<&str>,
    explicit_tenant: Option<&str>,
    path: Option<&str>,
) -> Option<String> {
    resolve_tenant_with_source(tag_tenant, explicit_tenant, path).0
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
