//! Retrieval tool
//!
//! Searches the calling tenant's namespace and returns the reranked
//! passages as plain text for the agent to ground its answer on.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use concierge_core::SessionFallback;
use concierge_rag::RetrievalPipeline;

use crate::input::{tool_input_schema, ToolArgs};
use crate::mcp::{Tool, ToolError, ToolOutput, ToolSchema};

pub struct RetrieveContextTool {
    pipeline: Arc<RetrievalPipeline>,
    fallback: SessionFallback,
}

impl RetrieveContextTool {
    pub fn new(pipeline: Arc<RetrievalPipeline>, fallback: SessionFallback) -> Self {
        Self { pipeline, fallback }
    }
}

#[async_trait]
impl Tool for RetrieveContextTool {
    fn name(&self) -> &str {
        "retrieve_context"
    }

    fn description(&self) -> &str {
        "Retrieve relevant information from the knowledge base for every user question. \
         Searches the knowledge base of the calling bot."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: tool_input_schema(true),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let context = ToolArgs::resolve(&input, &self.fallback)?;
        let namespace = self.pipeline.namespace_for(&context);

        let outcome = self.pipeline.retrieve(&context).await;

        tracing::info!(
            tool = self.name(),
            namespace = %namespace.name,
            tenant_source = context.tenant_source.as_str(),
            session_source = context.session_source.as_str(),
            outcome = outcome.label(),
            "Context retrieved"
        );
        metrics::counter!(
            "concierge_retrieval_outcomes_total",
            "outcome" => outcome.label()
        )
        .increment(1);

        Ok(ToolOutput::text(outcome.into_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{NOTHING_FOUND_MESSAGE, RESULTS_PREFIX};
    use concierge_rag::{InMemoryBackend, PipelineConfig};
    use serde_json::json;

    fn tool() -> RetrieveContextTool {
        let backend = InMemoryBackend::new();
        backend.insert_text("hr4s", "hours", "The clinic is open 9am to 5pm on weekdays.");
        backend.insert_text("Xyz", "xyz-hours", "Xyz opening hours are 8am to 8pm.");
        let pipeline = RetrievalPipeline::new(Arc::new(backend), PipelineConfig::default());
        RetrieveContextTool::new(Arc::new(pipeline), SessionFallback::default())
    }

    #[tokio::test]
    async fn test_path_tenant_selects_namespace() {
        let output = tool()
            .execute(json!({"query": "[PATH: e1/acme/Xyz] find hours"}))
            .await
            .unwrap();
        let text = output.text_content();
        assert!(text.starts_with(RESULTS_PREFIX));
        assert!(text.contains("xyz-hours"));
        assert!(!text.contains("\"hours\""));
    }

    #[tokio::test]
    async fn test_default_namespace() {
        let output = tool().execute(json!({"query": "clinic open"})).await.unwrap();
        assert!(output.text_content().contains("\"_id\":\"hours\""));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let output = tool()
            .execute(json!({"query": "[BOT_ID: empty] parking"}))
            .await
            .unwrap();
        assert_eq!(output.text_content(), NOTHING_FOUND_MESSAGE);
        assert!(!output.is_error);
    }

    #[tokio::test]
    async fn test_query_required_by_schema() {
        let tool = tool();
        assert!(tool.validate(&json!({"session_id": "s1"})).is_err());
        assert!(tool.validate(&json!({"query": "hours"})).is_ok());
    }
}
