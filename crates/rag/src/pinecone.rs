//! Pinecone backend
//!
//! Talks to the Pinecone REST API directly:
//! - `POST {index_host}/records/namespaces/{namespace}/search` for
//!   integrated-embedding similarity search
//! - `POST {inference_host}/rerank` for hosted cross-encoder reranking
//!
//! The API key travels in the `Api-Key` header; the API version is pinned
//! with `X-Pinecone-API-Version`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use concierge_config::RetrievalConfig;

use crate::backend::{RerankOptions, SearchHit, VectorBackend};
use crate::RagError;

/// Pinecone connection settings
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// Index data-plane host
    pub index_host: String,
    /// Inference API host
    pub inference_host: String,
    pub api_key: String,
    pub api_version: String,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl PineconeConfig {
    /// Build from retrieval settings; host and key must be present
    pub fn from_settings(settings: &RetrievalConfig) -> Result<Self, RagError> {
        let index_host = settings
            .index_host
            .clone()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| RagError::Configuration("retrieval.index_host is not set".into()))?;
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RagError::Configuration("Pinecone API key is not set".into()))?;

        Ok(Self {
            index_host,
            inference_host: settings.inference_host.clone(),
            api_key,
            api_version: settings.api_version.clone(),
            timeout_ms: settings.timeout_ms,
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: SearchQuery<'a>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    inputs: SearchInputs<'a>,
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct SearchInputs<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a Map<String, Value>>,
    top_n: usize,
    rank_fields: &'a [String],
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    data: Vec<RankedDocument>,
}

#[derive(Debug, Deserialize)]
struct RankedDocument {
    index: usize,
    score: f32,
}

/// Pinecone REST client
pub struct PineconeBackend {
    client: Client,
    config: PineconeConfig,
}

impl PineconeBackend {
    pub fn new(config: PineconeConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RagError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// `{host}/{segments...}` with each segment percent-encoded
    fn endpoint(host: &str, segments: &[&str]) -> Result<Url, RagError> {
        let mut url = Url::parse(host)
            .map_err(|e| RagError::Configuration(format!("Invalid host {}: {}", host, e)))?;
        url.path_segments_mut()
            .map_err(|_| RagError::Configuration(format!("Host cannot be a base: {}", host)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send_error(&self, what: &str, err: reqwest::Error) -> RagError {
        if err.is_timeout() {
            RagError::Timeout(self.config.timeout_ms)
        } else if err.is_connect() {
            RagError::Connection(format!("{} request failed: {}", what, err))
        } else {
            RagError::Search(format!("{} request failed: {}", what, err))
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        what: &str,
        url: Url,
        body: &B,
    ) -> Result<T, RagError> {
        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", &self.config.api_version)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(what, e))?;

        let response = Self::check_status(what, response).await?;

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RagError::Timeout(self.config.timeout_ms)
            } else {
                RagError::MalformedResponse(format!("Failed to read {} response: {}", what, e))
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            RagError::MalformedResponse(format!("Failed to parse {} response: {}", what, e))
        })
    }

    async fn check_status(what: &str, response: Response) -> Result<Response, RagError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RagError::Auth(format!(
                "{} rejected: {} - {}",
                what, status, text
            ))),
            _ if what == "rerank" => Err(RagError::Reranker(format!(
                "Pinecone rerank failed: {} - {}",
                status, text
            ))),
            _ => Err(RagError::Search(format!(
                "Pinecone {} failed: {} - {}",
                what, status, text
            ))),
        }
    }
}

#[async_trait]
impl VectorBackend for PineconeBackend {
    fn name(&self) -> &str {
        "Pinecone"
    }

    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let url = Self::endpoint(
            &self.config.index_host,
            &["records", "namespaces", namespace, "search"],
        )?;
        let request = SearchRequest {
            query: SearchQuery {
                inputs: SearchInputs { text: query },
                top_k,
            },
        };

        let response: SearchResponse = self.post("search", url, &request).await?;
        tracing::debug!(
            namespace,
            hits = response.result.hits.len(),
            "Pinecone search complete"
        );
        Ok(response.result.hits)
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchHit>,
        options: &RerankOptions,
    ) -> Result<Vec<SearchHit>, RagError> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let url = Self::endpoint(&self.config.inference_host, &["rerank"])?;
        let request = RerankRequest {
            model: &options.model,
            query,
            documents: candidates.iter().map(|c| &c.fields).collect(),
            top_n: options.top_n,
            rank_fields: &options.rank_fields,
            return_documents: false,
        };

        let response: RerankResponse = self.post("rerank", url, &request).await?;

        let mut ranked = Vec::with_capacity(response.data.len());
        for doc in response.data {
            let candidate = candidates.get(doc.index).ok_or_else(|| {
                RagError::MalformedResponse(format!(
                    "rerank index {} out of range for {} documents",
                    doc.index,
                    candidates.len()
                ))
            })?;
            let mut hit = candidate.clone();
            hit.score = doc.score;
            ranked.push(hit);
        }

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_namespace() {
        let url = PineconeBackend::endpoint(
            "https://idx.svc.pinecone.io",
            &["records", "namespaces", "a/b c", "search"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://idx.svc.pinecone.io/records/namespaces/a%2Fb%20c/search"
        );

        let url = PineconeBackend::endpoint("https://api.pinecone.io/", &["rerank"]).unwrap();
        assert_eq!(url.as_str(), "https://api.pinecone.io/rerank");
    }

    #[test]
    fn test_endpoint_rejects_bad_host() {
        assert!(matches!(
            PineconeBackend::endpoint("not a url", &["rerank"]),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn test_config_requires_host_and_key() {
        let mut settings = RetrievalConfig::default();
        settings.index_host = None;
        settings.api_key = Some("k".into());
        assert!(PineconeConfig::from_settings(&settings).is_err());

        settings.index_host = Some("https://idx.example".into());
        settings.api_key = Some("  ".into());
        assert!(PineconeConfig::from_settings(&settings).is_err());

        settings.api_key = Some("k".into());
        let config = PineconeConfig::from_settings(&settings).unwrap();
        assert_eq!(config.index_host, "https://idx.example");
        assert_eq!(config.api_version, "2025-01");
    }

    #[test]
    fn test_rerank_request_shape() {
        let mut fields = Map::new();
        fields.insert("text".into(), Value::from("hello"));
        let rank_fields = vec!["text".to_string()];
        let request = RerankRequest {
            model: "bge-reranker-v2-m3",
            query: "q",
            documents: vec![&fields],
            top_n: 5,
            rank_fields: &rank_fields,
            return_documents: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "bge-reranker-v2-m3");
        assert_eq!(json["documents"][0]["text"], "hello");
        assert_eq!(json["rank_fields"][0], "text");
        assert_eq!(json["top_n"], 5);
    }
}
