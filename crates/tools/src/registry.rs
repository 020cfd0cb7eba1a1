//! Tool Registry
//!
//! Manages tool registration, discovery, and execution.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use concierge_config::FormsConfig;
use concierge_core::{FormIntent, SessionFallback};
use concierge_rag::RetrievalPipeline;

use crate::forms::{FormRouter, FormTool};
use crate::mcp::{Tool, ToolError, ToolOutput, ToolSchema};
use crate::retrieve::RetrieveContextTool;

/// Tool executor trait
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError>;

    /// List available tools
    fn list_tools(&self) -> Vec<ToolSchema>;

    /// Get tool schema by name
    fn get_tool(&self, name: &str) -> Option<ToolSchema>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    /// Validate, then execute under the tool's own timeout
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", name)))?;

        tool.validate(&arguments)?;

        let timeout_secs = tool.timeout_secs();
        tracing::trace!(tool = name, timeout_secs, "Executing tool with timeout");

        match tokio::time::timeout(Duration::from_secs(timeout_secs), tool.execute(arguments)).await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(name, timeout_secs)),
        }
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    fn get_tool(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|t| t.schema())
    }
}

/// Registry with the three form tools and the retrieval tool
pub fn create_registry(
    forms: FormsConfig,
    pipeline: Arc<RetrievalPipeline>,
    fallback: SessionFallback,
) -> ToolRegistry {
    let router = Arc::new(FormRouter::new(forms));
    let mut registry = ToolRegistry::new();

    for intent in FormIntent::ALL {
        registry.register(FormTool::new(intent, router.clone(), fallback.clone()));
    }
    registry.register(RetrieveContextTool::new(pipeline, fallback));

    tracing::info!(tools = ?registry.tool_names(), "Tool registry created");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{ErrorCode, InputSchema};
    use concierge_rag::{InMemoryBackend, PipelineConfig};
    use serde_json::json;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Never finishes in time"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "slow".into(),
                description: self.description().into(),
                input_schema: InputSchema::object(),
            }
        }

        async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolOutput::text("late"))
        }

        fn timeout_secs(&self) -> u64 {
            1
        }
    }

    fn registry() -> ToolRegistry {
        let pipeline = RetrievalPipeline::new(Arc::new(InMemoryBackend::new()), PipelineConfig::default());
        create_registry(
            FormsConfig::default(),
            Arc::new(pipeline),
            SessionFallback::default(),
        )
    }

    #[test]
    fn test_registry_has_four_tools() {
        let registry = registry();
        assert_eq!(
            registry.tool_names(),
            vec![
                "book_appointment",
                "cancel_appointment",
                "reschedule_appointment",
                "retrieve_context"
            ]
        );
        assert_eq!(registry.list_tools().len(), 4);
        assert!(registry.get_tool("retrieve_context").is_some());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().execute("nope", json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("nope"));
    }

    #[tokio::test]
    async fn test_validation_runs_before_execute() {
        let err = registry()
            .execute("retrieve_context", json!({"bot_id": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn test_timeout_enforced() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        let err = registry.execute("slow", json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
    }
}
