//! In-memory keyword backend
//!
//! Holds documents per namespace in process and scores them with
//! [`KeywordScorer`] for both search and rerank. Can be seeded from a YAML
//! file so the server runs without a hosted index.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::backend::{RerankOptions, SearchHit, VectorBackend};
use crate::scorer::KeywordScorer;
use crate::RagError;

/// One document in a seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDocument {
    pub id: String,
    /// Searchable text, stored as the `text` field
    pub text: String,
    /// Any other fields, stored alongside `text`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Seed file format: documents grouped by namespace
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub namespaces: HashMap<String, Vec<SeedDocument>>,
}

/// Process-local vector backend
#[derive(Default)]
pub struct InMemoryBackend {
    namespaces: RwLock<HashMap<String, Vec<SearchHit>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed seed file
    pub fn from_seed(seed: SeedFile) -> Self {
        let backend = Self::new();
        for (namespace, docs) in seed.namespaces {
            for doc in docs {
                let mut fields = doc.extra;
                fields.insert("text".to_string(), Value::String(doc.text));
                backend.upsert(&namespace, doc.id, fields);
            }
        }
        backend
    }

    /// Parse a YAML seed document
    pub fn from_seed_str(yaml: &str) -> Result<Self, RagError> {
        let seed: SeedFile = serde_yaml::from_str(yaml)
            .map_err(|e| RagError::Index(format!("YAML parse error: {}", e)))?;
        Ok(Self::from_seed(seed))
    }

    /// Load a YAML seed file; a missing file yields an empty backend
    pub fn from_seed_file(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Seed file does not exist, starting empty");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Index(format!("Failed to read file: {}", e)))?;
        let backend = Self::from_seed_str(&content)?;

        tracing::info!(
            path = %path.display(),
            namespaces = backend.namespaces.read().len(),
            "Loaded retrieval seed"
        );
        Ok(backend)
    }

    /// Insert or replace a record
    pub fn upsert(&self, namespace: &str, id: impl Into<String>, fields: Map<String, Value>) {
        let id = id.into();
        let mut namespaces = self.namespaces.write();
        let docs = namespaces.entry(namespace.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.fields = fields,
            None => docs.push(SearchHit::new(id, 0.0, fields)),
        }
    }

    /// Insert a record carrying only a `text` field
    pub fn insert_text(&self, namespace: &str, id: impl Into<String>, text: impl Into<String>) {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(text.into()));
        self.upsert(namespace, id, fields);
    }

    /// Number of records in a namespace
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces.read().get(namespace).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.read().values().all(Vec::is_empty)
    }
}

fn sort_by_score_desc(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[async_trait]
impl VectorBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "in-memory index"
    }

    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let namespaces = self.namespaces.read();
        let Some(docs) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = docs
            .iter()
            .filter_map(|doc| {
                let text = doc.field_str("text").unwrap_or_default();
                let score = KeywordScorer::score(query, text);
                (score > 0.0).then(|| SearchHit::new(doc.id.clone(), score, doc.fields.clone()))
            })
            .collect();

        sort_by_score_desc(&mut hits);
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchHit>,
        options: &RerankOptions,
    ) -> Result<Vec<SearchHit>, RagError> {
        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .map(|mut hit| {
                hit.score = KeywordScorer::score(query, &hit.rank_text(&options.rank_fields));
                hit
            })
            .collect();

        sort_by_score_desc(&mut hits);
        hits.truncate(options.top_n);
        Ok(hits)
    }
}
