//! Pinecone data-plane REST client.
//!
//! Index creation is an administrative step done once in the Pinecone
//! console or API; this client only queries and upserts against an existing
//! index host.

use super::{Match, MatchMetadata, VectorRecord, VectorStore};
use crate::config::IndexConfig;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2024-07";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

/// Pinecone rejects null metadata values, so absent fields are omitted.
#[derive(Debug, Serialize)]
struct WireMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_source: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: WireMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<WireVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

impl<'a> From<&'a VectorRecord> for WireVector<'a> {
    fn from(record: &'a VectorRecord) -> Self {
        let MatchMetadata { text, file_source } = &record.metadata;
        Self {
            id: &record.id,
            values: &record.values,
            metadata: WireMetadata {
                text: text.as_deref(),
                file_source: file_source.as_deref(),
            },
        }
    }
}

/// Vector store backed by a hosted Pinecone index.
#[derive(Clone)]
pub struct PineconeStore {
    client: Client,
    config: IndexConfig,
}

impl PineconeStore {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        let host = self.config.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host, path)
        } else {
            format!("https://{}{}", host, path)
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RagEvalError::VectorIndex(format!(
                "{} {} failed ({}): {}",
                self.config.name, path, status, text
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.config.namespace.as_deref(),
        };

        let body = self.post("/query", &request).await?;
        let response: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| RagEvalError::VectorIndex(format!("invalid query response: {}", e)))?;
        Ok(response.matches)
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            vectors: records.iter().map(WireVector::from).collect(),
            namespace: self.config.namespace.as_deref(),
        };
        self.post("/vectors/upsert", &request).await?;
        Ok(())
    }
}
