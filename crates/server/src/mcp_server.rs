//! MCP JSON-RPC handling
//!
//! One dispatcher shared by the HTTP `/mcp` route and the stdio transport.
//! Supports `initialize`, `ping`, `tools/list` and `tools/call`;
//! notifications are accepted and never answered.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::time::Instant;

use concierge_tools::{
    methods, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ToolCallParams, ToolError, ToolExecutor, ToolOutput,
};

use crate::metrics::record_tool_call;
use crate::state::AppState;

pub const SERVER_NAME: &str = "concierge";

/// Metric label for names the registry does not know; keeps caller-supplied
/// names out of the series set
pub const UNKNOWN_TOOL_LABEL: &str = "unknown";

fn metric_label<'a>(tools: &dyn ToolExecutor, name: &'a str) -> &'a str {
    if tools.get_tool(name).is_some() {
        name
    } else {
        UNKNOWN_TOOL_LABEL
    }
}

/// Execute a tool with logging and metrics
pub async fn execute_tool(
    tools: &dyn ToolExecutor,
    name: &str,
    arguments: Value,
) -> Result<ToolOutput, ToolError> {
    let start = Instant::now();
    let result = tools.execute(name, arguments).await;
    let latency = start.elapsed();

    let outcome = match &result {
        Ok(output) if output.is_error => "tool_error",
        Ok(_) => "success",
        Err(e) => e.code.as_str(),
    };

    match &result {
        Err(e) => tracing::warn!(
            tool = name,
            outcome,
            error = %e,
            latency_ms = latency.as_millis() as u64,
            "Tool call failed"
        ),
        Ok(_) => tracing::debug!(
            tool = name,
            outcome,
            latency_ms = latency.as_millis() as u64,
            "Tool call complete"
        ),
    }
    record_tool_call(metric_label(tools, name), outcome, latency);

    result
}

/// Dispatch one request; `None` for notifications
pub async fn handle_rpc(tools: &dyn ToolExecutor, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    // Notifications are never answered, not even with an error
    if request.is_notification() {
        tracing::debug!(method = %request.method, jsonrpc = %request.jsonrpc, "Notification received");
        return None;
    }

    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::error(
            request.id,
            JsonRpcError::new(ErrorCode::InvalidRequest, "jsonrpc must be \"2.0\""),
        ));
    }

    let id = request.id.clone();
    let result = match request.method.as_str() {
        methods::INITIALIZE => serde_json::to_value(InitializeResult::new(
            SERVER_NAME,
            env!("CARGO_PKG_VERSION"),
        ))
        .map_err(|e| JsonRpcError::new(ErrorCode::InternalError, e.to_string())),
        methods::PING => Ok(json!({})),
        methods::TOOLS_LIST => Ok(json!({ "tools": tools.list_tools() })),
        methods::TOOLS_CALL => call_tool(tools, request.params).await,
        other => Err(JsonRpcError::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", other),
        )),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(error) => JsonRpcResponse::error(id, error),
    })
}

async fn call_tool(tools: &dyn ToolExecutor, params: Option<Value>) -> Result<Value, JsonRpcError> {
    let params: ToolCallParams = params
        .ok_or_else(|| JsonRpcError::new(ErrorCode::InvalidParams, "Missing params"))
        .and_then(|p| {
            serde_json::from_value(p).map_err(|e| {
                JsonRpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {}", e))
            })
        })?;

    let output = execute_tool(tools, &params.name, params.arguments).await?;
    serde_json::to_value(output).map_err(|e| JsonRpcError::new(ErrorCode::InternalError, e.to_string()))
}

/// Parse and dispatch one serialized message; `None` when nothing is owed
pub async fn handle_line(tools: &dyn ToolExecutor, line: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                None,
                JsonRpcError::new(ErrorCode::ParseError, format!("Parse error: {}", e)),
            ))
        }
    };

    match serde_json::from_value::<JsonRpcRequest>(value.clone()) {
        Ok(request) => handle_rpc(tools, request).await,
        Err(e) => {
            // Echo the id when it is readable
            let id = value.get("id").cloned().and_then(|id| serde_json::from_value(id).ok());
            Some(JsonRpcResponse::error(
                id,
                JsonRpcError::new(ErrorCode::InvalidRequest, format!("Invalid request: {}", e)),
            ))
        }
    }
}

/// POST /mcp
pub async fn handle_mcp_request(State(state): State<AppState>, body: String) -> Response {
    match handle_line(state.tools.as_ref(), &body).await {
        Some(response) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            serde_json::to_string(&response).unwrap_or_default(),
        )
            .into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
