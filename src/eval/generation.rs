//! Generation quality: lexical overlap with the reference answer plus
//! embedding-based faithfulness and relevancy.

use super::benchmark::{BenchmarkItem, progress_bar};
use super::metrics::{RougeScorer, mean, sentence_bleu};
use crate::config::EvalConfig;
use crate::embedding::RelevanceScorer;
use crate::engine::RagEngine;
use crate::error::Result;
use crate::llm::ChatSession;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Scores for one generated answer, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub bleu: f64,
    pub rouge1: f64,
    pub rouge2: f64,
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
    /// Reference answer vs generated answer.
    pub semantic_similarity: f64,
    /// Generated answer vs the passages retrieved for the question.
    pub faithfulness: f64,
    /// Question vs generated answer.
    pub answer_relevancy: f64,
}

/// Dataset-level generation means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub avg_bleu: f64,
    pub avg_rouge1: f64,
    pub avg_rouge2: f64,
    #[serde(rename = "avg_rougeL")]
    pub avg_rouge_l: f64,
    pub avg_semantic_similarity: f64,
    pub avg_faithfulness: f64,
    pub avg_answer_relevancy: f64,
    pub items_evaluated: usize,
    /// Items whose generation failed and were scored as all zeros.
    pub items_failed: usize,
}

impl GenerationSummary {
    pub fn from_metrics(metrics: &[GenerationMetrics], items_failed: usize) -> Self {
        let column = |f: fn(&GenerationMetrics) -> f64| -> f64 {
            mean(&metrics.iter().map(f).collect::<Vec<_>>())
        };

        Self {
            avg_bleu: column(|m| m.bleu),
            avg_rouge1: column(|m| m.rouge1),
            avg_rouge2: column(|m| m.rouge2),
            avg_rouge_l: column(|m| m.rouge_l),
            avg_semantic_similarity: column(|m| m.semantic_similarity),
            avg_faithfulness: column(|m| m.faithfulness),
            avg_answer_relevancy: column(|m| m.answer_relevancy),
            items_evaluated: metrics.len(),
            items_failed,
        }
    }
}

/// Runs the RAG engine on benchmark questions and scores its answers.
pub struct GenerationEvaluator {
    engine: RagEngine,
    scorer: RelevanceScorer,
    rouge: RougeScorer,
    answer_top_k: usize,
    faithfulness_top_k: usize,
    isolate_sessions: bool,
    show_progress: bool,
}

impl GenerationEvaluator {
    pub fn new(engine: RagEngine, scorer: RelevanceScorer, config: &EvalConfig) -> Self {
        Self {
            engine,
            scorer,
            rouge: RougeScorer::new(),
            answer_top_k: config.answer_top_k,
            faithfulness_top_k: config.faithfulness_top_k,
            isolate_sessions: config.isolate_sessions,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Generate and score an answer for one item.
    pub async fn evaluate_item(
        &self,
        session: &mut ChatSession,
        item: &BenchmarkItem,
    ) -> Result<GenerationMetrics> {
        let answer = self
            .engine
            .generate_answer(session, &item.question, self.answer_top_k)
            .await?;

        let rouge = self.rouge.score(&item.reference_answer, &answer);
        let semantic_similarity = self.scorer.score(&item.reference_answer, &answer).await?;
        let faithfulness = self.faithfulness(&item.question, &answer).await?;
        let answer_relevancy = self.scorer.score(&item.question, &answer).await?;

        let metrics = GenerationMetrics {
            bleu: sentence_bleu(&item.reference_answer, &answer),
            rouge1: rouge.rouge1,
            rouge2: rouge.rouge2,
            rouge_l: rouge.rouge_l,
            semantic_similarity,
            faithfulness,
            answer_relevancy,
        };
        debug!(question = %item.question, ?metrics, "generation scored");
        Ok(metrics)
    }

    /// Similarity of `answer` to the space-joined passages retrieved for
    /// `question`; 0 when nothing usable is retrieved.
    async fn faithfulness(&self, question: &str, answer: &str) -> Result<f64> {
        let texts = self
            .engine
            .retriever()
            .search_texts(question, self.faithfulness_top_k)
            .await?;
        let context = texts.join(" ");
        if context.trim().is_empty() {
            return Ok(0.0);
        }
        self.scorer.score(answer, &context).await
    }

    /// Evaluate every item in order. A failing item is logged and scored as
    /// zeros. Unless sessions are shared, `session` is reset before each item.
    pub async fn evaluate(
        &self,
        session: &mut ChatSession,
        items: &[BenchmarkItem],
    ) -> GenerationSummary {
        info!(items = items.len(), "evaluating generation");
        let progress = progress_bar(items.len() as u64, self.show_progress);
        progress.set_message("generation");

        let mut metrics = Vec::with_capacity(items.len());
        let mut failed = 0;

        for item in items {
            if self.isolate_sessions {
                session.reset();
            }

            let row = match self.evaluate_item(session, item).await {
                Ok(row) => row,
                Err(e) => {
                    warn!(question = %item.question, error = %e, "generation failed, scoring zero");
                    failed += 1;
                    GenerationMetrics::default()
                }
            };
            metrics.push(row);
            progress.inc(1);
        }

        progress.finish_and_clear();
        GenerationSummary::from_metrics(&metrics, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::index::Retriever;
    use crate::test_support::{KeywordEmbedder, ScriptedGenerator, store_with_passages};
    use std::sync::Arc;

    const CONTEXT: &str = "The citadel was built by the Nguyen dynasty in 1805.";

    fn item(question: &str) -> BenchmarkItem {
        BenchmarkItem {
            question: question.into(),
            reference_answer: CONTEXT.into(),
            supporting_context: CONTEXT.into(),
            source_title: "Hue".into(),
            source_id: "hue.json".into(),
        }
    }

    async fn evaluator(
        passages: &[Option<&str>],
        generator: Arc<ScriptedGenerator>,
        config: &EvalConfig,
    ) -> GenerationEvaluator {
        let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder::default());
        let store = store_with_passages(&embedder, passages).await;
        let engine = RagEngine::new(Retriever::new(embedder.clone(), store), generator);
        GenerationEvaluator::new(engine, RelevanceScorer::new(embedder), config)
            .with_progress(false)
    }

    #[tokio::test]
    async fn test_perfect_answer_scores_high() {
        let generator = Arc::new(ScriptedGenerator::answering(CONTEXT));
        let evaluator = evaluator(&[Some(CONTEXT)], generator, &EvalConfig::default()).await;
        let mut session = ChatSession::new("system", 5);

        let metrics = evaluator
            .evaluate_item(&mut session, &item("Who built the citadel?"))
            .await
            .unwrap();

        assert!((metrics.rouge1 - 1.0).abs() < 1e-9);
        assert!((metrics.rouge2 - 1.0).abs() < 1e-9);
        assert!((metrics.rouge_l - 1.0).abs() < 1e-9);
        assert!(metrics.bleu > 0.99);
        assert!((metrics.semantic_similarity - 1.0).abs() < 1e-6);
        assert!((metrics.faithfulness - 1.0).abs() < 1e-6);
        assert!(metrics.answer_relevancy > 0.0 && metrics.answer_relevancy < 1.0);
    }

    #[tokio::test]
    async fn test_faithfulness_zero_without_context() {
        let generator = Arc::new(ScriptedGenerator::answering(CONTEXT));
        let evaluator = evaluator(&[None], generator, &EvalConfig::default()).await;
        let mut session = ChatSession::new("system", 5);

        let metrics = evaluator
            .evaluate_item(&mut session, &item("Who built the citadel?"))
            .await
            .unwrap();
        assert_eq!(metrics.faithfulness, 0.0);
        assert!(metrics.rouge1 > 0.99);
    }

    #[tokio::test]
    async fn test_failed_item_is_zero_row() {
        let generator =
            Arc::new(ScriptedGenerator::answering(CONTEXT).failing_on("Question: When"));
        let evaluator = evaluator(&[Some(CONTEXT)], generator, &EvalConfig::default()).await;
        let mut session = ChatSession::new("system", 5);

        let items = [item("Who built the citadel?"), item("When was it built?")];
        let summary = evaluator.evaluate(&mut session, &items).await;

        assert_eq!(summary.items_evaluated, 2);
        assert_eq!(summary.items_failed, 1);
        assert!((summary.avg_rouge1 - 0.5).abs() < 1e-9);
        assert!((summary.avg_faithfulness - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_sessions_isolated_by_default() {
        let generator = Arc::new(ScriptedGenerator::answering("answer"));
        let evaluator = evaluator(&[Some(CONTEXT)], generator, &EvalConfig::default()).await;
        let mut session = ChatSession::new("system", 5);

        evaluator
            .evaluate(&mut session, &[item("first?"), item("second?")])
            .await;
        assert_eq!(session.history().len(), 2);
        assert!(session.history()[0].content.contains("second?"));
    }

    #[tokio::test]
    async fn test_shared_session_accumulates() {
        let generator = Arc::new(ScriptedGenerator::answering("answer"));
        let config = EvalConfig {
            isolate_sessions: false,
            ..EvalConfig::default()
        };
        let evaluator = evaluator(&[Some(CONTEXT)], generator, &config).await;
        let mut session = ChatSession::new("system", 5);

        evaluator
            .evaluate(&mut session, &[item("first?"), item("second?")])
            .await;
        assert_eq!(session.history().len(), 4);
    }

    #[test]
    fn test_summary_serializes_rouge_l_key() {
        let json = serde_json::to_value(GenerationSummary::default()).unwrap();
        assert!(json.get("avg_rougeL").is_some());
        assert!(json.get("avg_semantic_similarity").is_some());
    }
}
