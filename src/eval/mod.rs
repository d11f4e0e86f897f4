//! Offline evaluation harness.
//!
//! This module provides:
//! - Synthetic QA benchmark construction from the corpus
//! - Retrieval scoring against each question's supporting paragraph
//! - Generation scoring with BLEU, ROUGE and embedding similarity
//! - Aggregation into a single report

pub mod benchmark;
pub mod generation;
pub mod metrics;
pub mod report;
pub mod retrieval;
pub mod runner;
pub mod synthesizer;

pub use benchmark::{Benchmark, BenchmarkBuilder, BenchmarkItem};
pub use generation::{GenerationEvaluator, GenerationMetrics, GenerationSummary};
pub use metrics::{RougeScorer, RougeScores, sentence_bleu};
pub use report::{DatasetInfo, EvaluationReport};
pub use retrieval::{RELEVANCE_THRESHOLD, RetrievalEvaluator, RetrievalMetrics, RetrievalSummary};
pub use runner::{Evaluation, RunOptions, seeded_rng};
pub use synthesizer::{QaPair, QaSynthesizer, QuestionTemplates, extract_answer};
