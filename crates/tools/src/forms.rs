//! Appointment form tools
//!
//! `book_appointment`, `cancel_appointment` and `reschedule_appointment`
//! each resolve the call context, pick a form template and hand back the
//! form URL tagged with the session id and a millisecond timestamp.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use concierge_config::FormsConfig;
use concierge_core::{DispatchError, FormIntent, FormResponse, ResolvedContext, SessionFallback};

use crate::input::{tool_input_schema, ToolArgs};
use crate::mcp::{Tool, ToolError, ToolOutput, ToolSchema};

/// Builds form URLs from the configured template table
#[derive(Debug, Clone)]
pub struct FormRouter {
    forms: FormsConfig,
}

impl FormRouter {
    pub fn new(forms: FormsConfig) -> Self {
        Self { forms }
    }

    /// Form URL for a resolved call at `ts_millis`
    pub fn build_url(
        &self,
        intent: FormIntent,
        context: &ResolvedContext,
        ts_millis: i64,
    ) -> Result<String, DispatchError> {
        let target = self.forms.target(intent, context.tenant_id.as_deref());
        if target.base_url.trim().is_empty() {
            return Err(DispatchError::Configuration(format!(
                "no {} form template configured",
                intent
            )));
        }

        Ok(format!(
            "{}{}session_id={}&ts={}",
            target.base_url, target.query_separator, context.session_id, ts_millis
        ))
    }

    /// Build the response for a call, stamping the current time
    pub fn dispatch(&self, intent: FormIntent, context: &ResolvedContext) -> FormResponse {
        let now = chrono::Utc::now().timestamp_millis();
        match self.build_url(intent, context, now) {
            Ok(url) => FormResponse::opened(intent, url, context.session_id.clone()),
            Err(e) => FormResponse::failed(intent, &e),
        }
    }
}

/// One of the three appointment form tools
pub struct FormTool {
    intent: FormIntent,
    name: String,
    router: Arc<FormRouter>,
    fallback: SessionFallback,
}

impl FormTool {
    pub fn new(intent: FormIntent, router: Arc<FormRouter>, fallback: SessionFallback) -> Self {
        Self {
            intent,
            name: format!("{}_appointment", intent.as_str()),
            router,
            fallback,
        }
    }
}

#[async_trait]
impl Tool for FormTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        match self.intent {
            FormIntent::Book => {
                "Open the appointment booking form so the user can fill it in and book an appointment."
            }
            FormIntent::Cancel => {
                "Open the appointment cancellation form so the user can fill it in and cancel an appointment."
            }
            FormIntent::Reschedule => {
                "Open the appointment rescheduling form so the user can fill it in and reschedule an appointment."
            }
        }
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description().to_string(),
            input_schema: tool_input_schema(false),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let context = ToolArgs::resolve(&input, &self.fallback)?;
        let response = self.router.dispatch(self.intent, &context);

        let outcome = if response.is_success() { "opened" } else { "failed" };
        tracing::info!(
            tool = %self.name,
            tenant = context.tenant_id.as_deref().unwrap_or("-"),
            tenant_source = context.tenant_source.as_str(),
            session_source = context.session_source.as_str(),
            outcome,
            "Form dispatched"
        );
        metrics::counter!(
            "concierge_form_dispatch_total",
            "intent" => self.intent.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        Ok(ToolOutput::text(response.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{ToolRequest, FALLBACK_SESSION_ID};
    use serde_json::json;

    fn router() -> Arc<FormRouter> {
        Arc::new(FormRouter::new(
            FormsConfig::default()
                .with_book_override("fp01", "https://forms.example.com/fp01/book?embed=1"),
        ))
    }

    fn ctx(raw: &str) -> ResolvedContext {
        ResolvedContext::resolve(&ToolRequest::new(raw), &SessionFallback::default())
    }

    #[test]
    fn test_url_separators() {
        let router = router();
        let url = router
            .build_url(FormIntent::Book, &ctx("[SESSION_ID: s1] [BOT_ID: fp01] book me in"), 42)
            .unwrap();
        assert_eq!(url, "https://forms.example.com/fp01/book?embed=1&session_id=s1&ts=42");

        let url = router
            .build_url(FormIntent::Cancel, &ctx("[SESSION_ID: s1] cancel"), 42)
            .unwrap();
        assert_eq!(url, "https://forms.example.com/appointments/cancel?session_id=s1&ts=42");
    }

    #[test]
    fn test_other_tenants_use_default_book_form() {
        let url = router()
            .build_url(FormIntent::Book, &ctx("[BOT_ID: acme] book"), 1)
            .unwrap();
        assert!(url.starts_with("https://forms.example.com/appointments/book?session_id="));
    }

    #[test]
    fn test_empty_template_is_configuration_error() {
        let mut forms = FormsConfig::default();
        forms.reschedule_url = String::new();
        let router = FormRouter::new(forms);

        let err = router
            .build_url(FormIntent::Reschedule, &ctx("move it"), 1)
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");

        let response = router.dispatch(FormIntent::Reschedule, &ctx("move it"));
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_tool_output() {
        let tool = FormTool::new(FormIntent::Reschedule, router(), SessionFallback::default());
        assert_eq!(tool.name(), "reschedule_appointment");

        let output = tool.execute(json!({"query": "move my visit"})).await.unwrap();
        assert!(!output.is_error);

        let body: Value = serde_json::from_str(&output.text_content()).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["session_id"], FALLBACK_SESSION_ID);
        assert_eq!(body["reply"], FormIntent::Reschedule.success_reply());
    }

    #[tokio::test]
    async fn test_explicit_arguments_used_without_tags() {
        let tool = FormTool::new(FormIntent::Book, router(), SessionFallback::default());
        let output = tool
            .execute(json!({"query": "book", "session_id": "abc", "bot_id": "fp01"}))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&output.text_content()).unwrap();
        let url = body["form_url"].as_str().unwrap();
        assert!(url.starts_with("https://forms.example.com/fp01/book?embed=1&session_id=abc&ts="));
    }
}
