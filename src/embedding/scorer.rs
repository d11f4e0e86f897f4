//! Semantic relevance between text spans.

use super::{Embedder, cosine_similarity};
use crate::error::{RagEvalError, Result};
use std::sync::Arc;

/// Scores text pairs by the cosine similarity of their embeddings.
///
/// Used as the relevance judge for retrieval, to pick supporting paragraphs
/// during synthesis, and for the semantic generation metrics.
#[derive(Clone)]
pub struct RelevanceScorer {
    embedder: Arc<dyn Embedder>,
}

impl RelevanceScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Raw cosine similarity in `[-1, 1]`.
    pub async fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let vectors = self.embedder.encode(&[a, b]).await?;
        match vectors.as_slice() {
            [va, vb] => Ok(cosine_similarity(va, vb)),
            _ => Err(RagEvalError::Embedding(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            ))),
        }
    }

    /// Similarity clamped to `[0, 1]`, the range reported by every metric.
    pub async fn score(&self, a: &str, b: &str) -> Result<f64> {
        let similarity = self.similarity(a, b).await?;
        Ok(f64::from(similarity).clamp(0.0, 1.0))
    }

    /// Index of the candidate most similar to `query`.
    ///
    /// Ties go to the earliest candidate. Returns `None` for an empty slice.
    pub async fn most_similar(&self, query: &str, candidates: &[&str]) -> Result<Option<usize>> {
        let best = self.best_matches(&[query], candidates).await?;
        Ok(best.into_iter().next().flatten())
    }

    /// For each query, the index of its most similar candidate.
    ///
    /// Every text is embedded once, so this is the cheap way to match many
    /// questions against the same paragraphs.
    pub async fn best_matches(
        &self,
        queries: &[&str],
        candidates: &[&str],
    ) -> Result<Vec<Option<usize>>> {
        if candidates.is_empty() {
            return Ok(vec![None; queries.len()]);
        }

        let query_vecs = self.encode_exact(queries).await?;
        let candidate_vecs = self.encode_exact(candidates).await?;

        Ok(query_vecs
            .iter()
            .map(|query_vec| argmax_similarity(query_vec, &candidate_vecs))
            .collect())
    }

    async fn encode_exact(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.encode(texts).await?;
        if vectors.len() != texts.len() {
            return Err(RagEvalError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

fn argmax_similarity(query: &[f32], candidates: &[Vec<f32>]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, vec) in candidates.iter().enumerate() {
        let sim = cosine_similarity(query, vec);
        match best {
            Some((_, best_sim)) if sim <= best_sim => {}
            _ => best = Some((idx, sim)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingEmbedder, KeywordEmbedder};

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(Arc::new(KeywordEmbedder::default()))
    }

    #[tokio::test]
    async fn test_identical_texts_score_one() {
        let score = scorer().score("hanoi university", "Hanoi university").await.unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_disjoint_texts_score_zero() {
        let score = scorer().score("alpha beta", "gamma delta").await.unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_most_similar_prefers_overlap() {
        let candidates = ["rivers and lakes", "founded in 1906 as a university", "music"];
        let best = scorer()
            .most_similar("when was the university founded", &candidates)
            .await
            .unwrap();
        assert_eq!(best, Some(1));
    }

    #[tokio::test]
    async fn test_most_similar_ties_pick_first() {
        let candidates = ["zzz", "yyy", "xxx"];
        let best = scorer().most_similar("unrelated", &candidates).await.unwrap();
        assert_eq!(best, Some(0));
    }

    #[tokio::test]
    async fn test_most_similar_empty() {
        assert_eq!(scorer().most_similar("q", &[]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_best_matches_per_query() {
        let candidates = ["the river delta", "the old citadel"];
        let best = scorer()
            .best_matches(&["citadel walls", "delta farming", "nothing"], &candidates)
            .await
            .unwrap();
        assert_eq!(best, vec![Some(1), Some(0), Some(0)]);
    }

    #[tokio::test]
    async fn test_embedder_failure_propagates() {
        let scorer = RelevanceScorer::new(Arc::new(FailingEmbedder));
        assert!(scorer.score("a", "b").await.is_err());
    }
}
