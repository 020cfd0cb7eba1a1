//! Prometheus Metrics
//!
//! Installs the global recorder and records per-tool call counts and
//! latency. Tools record their own domain outcomes (form dispatch and
//! retrieval outcome counters) through the same recorder.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::state::AppState;
use crate::ServerError;

pub const TOOL_CALLS_TOTAL: &str = "concierge_tool_calls_total";
pub const TOOL_LATENCY_SECONDS: &str = "concierge_tool_latency_seconds";

/// Install the Prometheus recorder; call once per process
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;

    ::metrics::describe_counter!(TOOL_CALLS_TOTAL, "Tool calls by tool and outcome");
    ::metrics::describe_histogram!(TOOL_LATENCY_SECONDS, "Tool call latency in seconds");

    Ok(handle)
}

/// Record one tool call
pub fn record_tool_call(tool: &str, outcome: &'static str, latency: Duration) {
    ::metrics::counter!(
        TOOL_CALLS_TOTAL,
        "tool" => tool.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!(TOOL_LATENCY_SECONDS, "tool" => tool.to_string())
        .record(latency.as_secs_f64());
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics are disabled".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_tool_call("book_appointment", "success", Duration::from_millis(3));
    }
}
