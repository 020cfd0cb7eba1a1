//! Vector backend abstraction
//!
//! A backend offers two calls: similarity search inside a namespace and
//! reranking of a candidate list against the query. Hits keep the exact
//! field map the index stored so callers can pass it through unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::RagError;

/// One scored record returned by search or rerank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score")]
    pub score: f32,

    /// Stored record fields, passed through untouched
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, score: f32, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            score,
            fields,
        }
    }

    /// String value of a field, if present and a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Concatenated text of the given fields, in order
    pub fn rank_text(&self, rank_fields: &[String]) -> String {
        rank_fields
            .iter()
            .filter_map(|f| self.field_str(f))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Single-line JSON rendering used in agent replies
    pub fn to_json_line(&self) -> String {
        serde_json::json!({
            "_id": self.id,
            "_score": self.score,
            "fields": self.fields,
        })
        .to_string()
    }
}

/// Rerank parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOptions {
    pub model: String,
    pub top_n: usize,
    pub rank_fields: Vec<String>,
}

/// A vector index with a reranker
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Name used in logs and user-facing error text
    fn name(&self) -> &str;

    /// Similarity search for `query` inside `namespace`
    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, RagError>;

    /// Rescore `candidates` against `query`; returned scores are rerank scores
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchHit>,
        options: &RerankOptions,
    ) -> Result<Vec<SearchHit>, RagError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> SearchHit {
        let mut fields = Map::new();
        fields.insert("text".into(), Value::from("Clinic opens at 9am"));
        fields.insert("title".into(), Value::from("Hours"));
        fields.insert("page".into(), Value::from(3));
        SearchHit::new("doc-1", 0.5, fields)
    }

    #[test]
    fn test_deserializes_index_shape() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"_id":"a","_score":0.25,"fields":{"text":"x"}}"#).unwrap();
        assert_eq!(hit.id, "a");
        assert_eq!(hit.field_str("text"), Some("x"));

        let bare: SearchHit = serde_json::from_str(r#"{"_id":"b","_score":1.0}"#).unwrap();
        assert!(bare.fields.is_empty());
    }

    #[test]
    fn test_rank_text_skips_missing_and_non_string() {
        let hit = hit();
        let fields = vec!["title".to_string(), "page".to_string(), "text".to_string()];
        assert_eq!(hit.rank_text(&fields), "Hours Clinic opens at 9am");
    }

    #[test]
    fn test_json_line_passes_fields_through() {
        let line = hit().to_json_line();
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["_id"], "doc-1");
        assert_eq!(value["fields"]["page"], 3);
        assert_eq!(value["fields"]["text"], "Clinic opens at 9am");
    }
}
