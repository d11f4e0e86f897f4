//! Retrieval quality: precision, recall, reciprocal rank and hit rate.
//!
//! Each query has exactly one ground-truth passage, the item's supporting
//! context. A retrieved passage counts as relevant when its embedding
//! similarity to that context exceeds [`RELEVANCE_THRESHOLD`].

use super::benchmark::{BenchmarkItem, progress_bar};
use super::metrics::mean;
use crate::embedding::RelevanceScorer;
use crate::error::Result;
use crate::index::Retriever;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Similarity above which a retrieved passage is judged relevant.
pub const RELEVANCE_THRESHOLD: f64 = 0.7;

/// Ranking metrics for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub precision: f64,
    /// Always 0 or 1: there is a single relevant passage per query.
    pub recall: f64,
    pub reciprocal_rank: f64,
    pub hit: bool,
}

impl RetrievalMetrics {
    /// Metrics for retrieved passages given their similarity to the ground
    /// truth, in rank order.
    pub fn from_similarities(similarities: &[f64]) -> Self {
        let relevant: Vec<usize> = similarities
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > RELEVANCE_THRESHOLD)
            .map(|(rank, _)| rank)
            .collect();

        let Some(&first_rank) = relevant.first() else {
            return Self::default();
        };

        let relevant_count = relevant.len() as f64;
        Self {
            precision: relevant_count / similarities.len() as f64,
            recall: relevant_count.min(1.0),
            reciprocal_rank: 1.0 / (first_rank + 1) as f64,
            hit: true,
        }
    }
}

/// Dataset-level retrieval means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSummary {
    pub avg_precision_at_k: f64,
    pub avg_recall_at_k: f64,
    pub avg_mrr: f64,
    pub hit_rate: f64,
    pub items_evaluated: usize,
    /// Items whose retrieval failed and were scored as all zeros.
    pub items_failed: usize,
}

impl RetrievalSummary {
    pub fn from_metrics(metrics: &[RetrievalMetrics], items_failed: usize) -> Self {
        let column = |f: fn(&RetrievalMetrics) -> f64| -> f64 {
            mean(&metrics.iter().map(f).collect::<Vec<_>>())
        };

        Self {
            avg_precision_at_k: column(|m| m.precision),
            avg_recall_at_k: column(|m| m.recall),
            avg_mrr: column(|m| m.reciprocal_rank),
            hit_rate: column(|m| if m.hit { 1.0 } else { 0.0 }),
            items_evaluated: metrics.len(),
            items_failed,
        }
    }
}

/// Scores the retriever against the benchmark's supporting contexts.
pub struct RetrievalEvaluator {
    retriever: Retriever,
    scorer: RelevanceScorer,
    show_progress: bool,
}

impl RetrievalEvaluator {
    pub fn new(retriever: Retriever, scorer: RelevanceScorer) -> Self {
        Self {
            retriever,
            scorer,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Retrieve `top_k` passages for one item and judge them.
    pub async fn evaluate_item(
        &self,
        item: &BenchmarkItem,
        top_k: usize,
    ) -> Result<RetrievalMetrics> {
        let texts = self.retriever.search_texts(&item.question, top_k).await?;

        let mut similarities = Vec::with_capacity(texts.len());
        for text in &texts {
            let similarity = self.scorer.similarity(&item.supporting_context, text).await?;
            similarities.push(f64::from(similarity));
        }

        let metrics = RetrievalMetrics::from_similarities(&similarities);
        debug!(question = %item.question, ?metrics, "retrieval scored");
        Ok(metrics)
    }

    /// Evaluate every item. A failing item is logged and scored as zeros.
    pub async fn evaluate(&self, items: &[BenchmarkItem], top_k: usize) -> RetrievalSummary {
        info!(items = items.len(), top_k, "evaluating retrieval");
        let progress = progress_bar(items.len() as u64, self.show_progress);
        progress.set_message("retrieval");

        let mut metrics = Vec::with_capacity(items.len());
        let mut failed = 0;

        for item in items {
            let row = match self.evaluate_item(item, top_k).await {
                Ok(row) => row,
                Err(e) => {
                    warn!(question = %item.question, error = %e, "retrieval failed, scoring zero");
                    failed += 1;
                    RetrievalMetrics::default()
                }
            };
            metrics.push(row);
            progress.inc(1);
        }

        progress.finish_and_clear();
        RetrievalSummary::from_metrics(&metrics, failed)
    }
}
