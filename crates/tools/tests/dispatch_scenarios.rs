//! End-to-end tool dispatch through the registry

use std::sync::Arc;

use serde_json::{json, Value};

use concierge_config::FormsConfig;
use concierge_core::{SessionFallback, FALLBACK_SESSION_ID, NOTHING_FOUND_MESSAGE};
use concierge_rag::{InMemoryBackend, PipelineConfig, RetrievalPipeline};
use concierge_tools::{create_registry, ToolExecutor, ToolRegistry};

const SEED: &str = r#"
namespaces:
  hr4s:
    - id: hr4s-hours
      text: "Our clinic hours are 9am to 5pm, Monday to Friday."
  Xyz:
    - id: xyz-hours
      text: "Xyz hours are 8am to 8pm every day."
      source: "faq.pdf"
  QApixW:
    - id: eye-exam
      text: "A comprehensive eye exam takes about 45 minutes."
"#;

const FP01_BOOK: &str = "https://forms.example.com/appointments/book?location=fp01";

fn registry(fallback: SessionFallback) -> ToolRegistry {
    let backend = InMemoryBackend::from_seed_str(SEED).unwrap();
    let pipeline = RetrievalPipeline::new(Arc::new(backend), PipelineConfig::default());
    let forms = FormsConfig::default().with_book_override("fp01", FP01_BOOK);
    create_registry(forms, Arc::new(pipeline), fallback)
}

async fn call_json(registry: &ToolRegistry, tool: &str, args: Value) -> Value {
    let output = registry.execute(tool, args).await.unwrap();
    assert!(!output.is_error);
    serde_json::from_str(&output.text_content()).unwrap()
}

async fn call_text(registry: &ToolRegistry, tool: &str, args: Value) -> String {
    let output = registry.execute(tool, args).await.unwrap();
    assert!(!output.is_error);
    output.text_content()
}

#[tokio::test]
async fn test_tagged_booking_uses_tenant_form() {
    let registry = registry(SessionFallback::default());
    let body = call_json(
        &registry,
        "book_appointment",
        json!({"query": "[SESSION_ID: s1] [BOT_ID: fp01] book me in"}),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["session_id"], "s1");

    let url = body["form_url"].as_str().unwrap();
    let rest = url
        .strip_prefix(&format!("{}&session_id=s1&ts=", FP01_BOOK))
        .unwrap();
    assert!(rest.parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn test_path_tenant_selects_namespace() {
    let registry = registry(SessionFallback::default());
    let text = call_text(
        &registry,
        "retrieve_context",
        json!({"query": "[PATH: e1/acme/Xyz] find hours"}),
    )
    .await;

    let body = text.strip_prefix("Here's what I found:\n\n").unwrap();
    let first: Value = serde_json::from_str(body.lines().next().unwrap()).unwrap();
    assert_eq!(first["_id"], "xyz-hours");
    assert_eq!(first["fields"]["source"], "faq.pdf");
}

#[tokio::test]
async fn test_untagged_call_uses_fallback_session() {
    let registry = registry(SessionFallback::default());
    for tool in ["book_appointment", "cancel_appointment", "reschedule_appointment"] {
        let body = call_json(&registry, tool, json!({"query": "I need to change my visit"})).await;
        assert_eq!(body["session_id"], FALLBACK_SESSION_ID);
        assert!(body["form_url"]
            .as_str()
            .unwrap()
            .contains("?session_id=fallback-session-id&ts="));
    }
}

#[tokio::test]
async fn test_generated_sessions_are_distinct() {
    let registry = registry(SessionFallback::Generate);
    let a = call_json(&registry, "cancel_appointment", json!({"query": "cancel"})).await;
    let b = call_json(&registry, "cancel_appointment", json!({"query": "cancel"})).await;
    assert_ne!(a["session_id"], b["session_id"]);
    assert_ne!(a["session_id"], FALLBACK_SESSION_ID);
}

#[tokio::test]
async fn test_explicit_bot_id_argument() {
    let registry = registry(SessionFallback::default());
    let text = call_text(
        &registry,
        "retrieve_context",
        json!({"query": "how long is an eye exam", "bot_id": "QApixW"}),
    )
    .await;
    assert!(text.contains("eye-exam"));

    // The tag beats the explicit argument
    let text = call_text(
        &registry,
        "retrieve_context",
        json!({"query": "[BOT_ID: Xyz] hours", "bot_id": "QApixW"}),
    )
    .await;
    assert!(text.contains("xyz-hours"));
}

#[tokio::test]
async fn test_unknown_tenant_finds_nothing() {
    let registry = registry(SessionFallback::default());
    let text = call_text(
        &registry,
        "retrieve_context",
        json!({"query": "[BOT_ID: nobody] hours"}),
    )
    .await;
    assert_eq!(text, NOTHING_FOUND_MESSAGE);
}

#[tokio::test]
async fn test_default_namespace_without_tenant() {
    let registry = registry(SessionFallback::default());
    let text = call_text(
        &registry,
        "retrieve_context",
        json!({"query": "[SESSION_ID: s7] clinic hours"}),
    )
    .await;
    assert!(text.contains("hr4s-hours"));
    assert!(!text.contains("SESSION_ID"));
}
