//! HTTP Endpoints
//!
//! MCP JSON-RPC on `/mcp`, a plain REST view of the tools, health and
//! Prometheus metrics.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use concierge_tools::ToolExecutor;

use crate::auth::auth_middleware;
use crate::mcp_server::{execute_tool, handle_mcp_request};
use crate::metrics::metrics_handler;
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/mcp", post(handle_mcp_request))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(call_tool))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Auth runs inside CORS and tracing, before handlers
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(state.config.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// CORS from configured origins
///
/// - Disabled: permissive (development only)
/// - No origins configured: localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let parsed_origins = if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        tracing::info!("CORS configured with {} origins", parsed_origins.len());
        parsed_origins
    };

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// List tools
async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "tools": state.tools.list_tools() }))
}

/// Tool call request
#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    #[serde(default = "empty_object")]
    arguments: Value,
}

fn empty_object() -> Value {
    json!({})
}

/// Call a tool directly, outside JSON-RPC
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ToolCallRequest>,
) -> (StatusCode, Json<Value>) {
    match execute_tool(state.tools.as_ref(), &name, request.arguments).await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_else(|e| json!({ "error": e.to_string() }))),
        ),
        Err(e) => {
            let status = if state.tools.has(&name) {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::NOT_FOUND
            };
            (
                status,
                Json(json!({
                    "content": [{ "type": "text", "text": e.message }],
                    "isError": true,
                    "code": e.code.code(),
                })),
            )
        }
    }
}

/// Liveness plus a summary of what is wired
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let tool_count = state.tools.len();
    let status = if tool_count > 0 { "healthy" } else { "degraded" };

    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "tools": tool_count,
            "retrieval_backend": format!("{:?}", state.config.retrieval.backend).to_lowercase(),
            "transport": format!("{:?}", state.config.server.transport).to_lowercase(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_config::Settings;
    use concierge_tools::ToolRegistry;

    #[test]
    fn test_router_creation() {
        let state = AppState::with_registry(Settings::default(), ToolRegistry::new());
        let _ = create_router(state);
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://app.example.com".to_string()], true);
        let _ = build_cors_layer(&["bad\norigin".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }
}
