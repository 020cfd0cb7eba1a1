//! Shared tool arguments
//!
//! Every tool takes the raw `query` plus optional `session_id` and `bot_id`
//! (`tenant_id` is accepted as an alias). The query may carry embedded
//! metadata tags; resolution happens in [`ToolArgs::resolve`].

use serde::Deserialize;
use serde_json::Value;

use concierge_core::{ResolvedContext, SessionFallback, ToolRequest};

use crate::mcp::{InputSchema, PropertySchema, ToolError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolArgs {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, alias = "tenant_id")]
    pub bot_id: Option<String>,
}

impl ToolArgs {
    pub fn from_value(input: &Value) -> Result<Self, ToolError> {
        Self::deserialize(input)
            .map_err(|e| ToolError::invalid_params(format!("Invalid arguments: {}", e)))
    }

    pub fn into_request(self) -> ToolRequest {
        ToolRequest {
            raw_query: self.query.unwrap_or_default(),
            explicit_session_id: self.session_id,
            explicit_tenant_id: self.bot_id,
        }
    }

    /// Parse and resolve in one step
    pub fn resolve(input: &Value, fallback: &SessionFallback) -> Result<ResolvedContext, ToolError> {
        let request = Self::from_value(input)?.into_request();
        Ok(ResolvedContext::resolve(&request, fallback))
    }
}

/// Argument schema shared by all tools
pub fn tool_input_schema(query_required: bool) -> InputSchema {
    InputSchema::object()
        .property(
            "query",
            PropertySchema::string(
                "The user's message, verbatim, including any [SESSION_ID: ...], [PATH: ...] or [BOT_ID: ...] tags",
            ),
            query_required,
        )
        .property(
            "session_id",
            PropertySchema::string("Conversation session id, used when the query carries none"),
            false,
        )
        .property(
            "bot_id",
            PropertySchema::string("Tenant (bot) id, used when the query carries none"),
            false,
        )
}
