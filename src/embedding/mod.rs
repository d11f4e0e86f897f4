//! Sentence embeddings and the semantic relevance scorer built on them.
//!
//! Two backends implement [`Embedder`]:
//! - [`ApiEmbedder`]: any OpenAI-compatible `/v1/embeddings` endpoint
//! - `LocalEmbedder`: all-MiniLM-L6-v2 run in-process with candle
//!   (feature `local-embeddings`)

mod api;
#[cfg(feature = "local-embeddings")]
mod local;
mod scorer;

pub use api::ApiEmbedder;
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use scorer::RelevanceScorer;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Maps texts to fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts, returning one vector per input in order.
    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors produced.
    fn dimension(&self) -> usize;

    /// Encode a single text.
    async fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagEvalError::Embedding("embedder returned no vector".to_string()))
    }
}

/// Build the embedder selected by configuration.
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Api => Ok(Arc::new(ApiEmbedder::new(config.clone()))),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProvider::Local => Ok(Arc::new(LocalEmbedder::load(&config.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProvider::Local => Err(RagEvalError::Config(
            "local embeddings require building with --features local-embeddings".to_string(),
        )),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[test]
    fn test_local_provider_needs_feature() {
        let config = EmbeddingConfig::default();
        assert!(matches!(from_config(&config), Err(RagEvalError::Config(_))));
    }
}
