//! Loading layered YAML configuration from disk

use std::fs;

use concierge_config::{load_settings_from, BackendKind, ConfigError, Transport};
use concierge_core::{FormIntent, SessionFallback};

const DEFAULT_YAML: &str = r#"
server:
  port: 9100
forms:
  book:
    default_url: "https://forms.example.com/book"
    tenants:
      - tenant: fp01
        url: "https://forms.example.com/fp01/book?embed=1"
      - tenant: QApixW
        url: "https://forms.example.com/qapixw/book"
  cancel_url: "https://forms.example.com/cancel"
  reschedule_url: "https://forms.example.com/reschedule"
retrieval:
  backend: memory
  default_namespace: "hr4s"
session:
  fallback:
    mode: shared
"#;

#[test]
fn test_loads_default_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.yaml"), DEFAULT_YAML).unwrap();

    let settings = load_settings_from(dir.path(), None).unwrap();
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.retrieval.backend, BackendKind::Memory);
    assert_eq!(
        settings.forms.template(FormIntent::Book, Some("fp01")),
        "https://forms.example.com/fp01/book?embed=1"
    );
    assert_eq!(
        settings.forms.template(FormIntent::Book, Some("acme")),
        "https://forms.example.com/book"
    );
    assert_eq!(settings.session.fallback, SessionFallback::default());
}

#[test]
fn test_mixed_case_tenant_keeps_its_form() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.yaml"), DEFAULT_YAML).unwrap();

    let settings = load_settings_from(dir.path(), None).unwrap();
    assert_eq!(
        settings.forms.template(FormIntent::Book, Some("QApixW")),
        "https://forms.example.com/qapixw/book"
    );
    assert_eq!(
        settings.forms.template(FormIntent::Book, Some("qapixw")),
        "https://forms.example.com/book"
    );
}

#[test]
fn test_env_file_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("default.yaml"), DEFAULT_YAML).unwrap();
    fs::write(
        dir.path().join("stdio.yaml"),
        "server:\n  transport: stdio\nsession:\n  fallback:\n    mode: generate\n",
    )
    .unwrap();

    let settings = load_settings_from(dir.path(), Some("stdio")).unwrap();
    assert_eq!(settings.server.transport, Transport::Stdio);
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.session.fallback, SessionFallback::Generate);
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings_from(dir.path(), Some("nope")).unwrap();
    assert_eq!(settings.retrieval.top_k, 7);
    assert_eq!(settings.retrieval.top_n, 5);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.yaml"),
        "retrieval:\n  top_k: 3\n  top_n: 4\n",
    )
    .unwrap();

    match load_settings_from(dir.path(), None) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "retrieval.top_n"),
        other => panic!("expected invalid top_n, got {:?}", other),
    }
}
