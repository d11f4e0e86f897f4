//! OpenAI-compatible embeddings endpoint.

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Embedder backed by a remote `/v1/embeddings` API.
#[derive(Clone)]
pub struct ApiEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl ApiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/embeddings", base)
    }
}

/// Order vectors by their reported index; providers may return them shuffled.
fn into_ordered_vectors(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(RagEvalError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RagEvalError::Embedding(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| RagEvalError::Embedding(format!("invalid response: {}", e)))?;
        into_ordered_vectors(parsed, texts.len())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_follow_reported_index() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [{"embedding": [2.0], "index": 1}, {"embedding": [1.0], "index": 0}]}"#,
        )
        .unwrap();
        let vectors = into_ordered_vectors(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [1.0]}]}"#).unwrap();
        assert!(into_ordered_vectors(response, 2).is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let embedder = ApiEmbedder::new(EmbeddingConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        assert!(embedder.encode(&[]).await.unwrap().is_empty());
    }
}
