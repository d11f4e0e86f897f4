//! End-to-end evaluation: benchmark, retrieval, generation, report.

use super::benchmark::{Benchmark, BenchmarkBuilder};
use super::generation::GenerationEvaluator;
use super::report::{DatasetInfo, EvaluationReport};
use super::retrieval::RetrievalEvaluator;
use super::synthesizer::{QaSynthesizer, QuestionTemplates};
use crate::config::EvalConfig;
use crate::embedding::{Embedder, RelevanceScorer};
use crate::engine::RagEngine;
use crate::error::Result;
use crate::index::{Retriever, VectorStore};
use crate::llm::{ChatSession, Generator};
use crate::persistence::{load_benchmark, save_benchmark, save_report};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A seeded generator when `seed` is set, else one seeded from the OS.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Where the benchmark comes from and where artifacts go.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub corpus_path: PathBuf,
    /// Reuse a stored benchmark instead of synthesizing one.
    pub dataset: Option<PathBuf>,
    pub dataset_output: PathBuf,
    pub report_output: PathBuf,
}

/// The evaluation harness wired to its collaborators.
pub struct Evaluation {
    config: EvalConfig,
    builder: BenchmarkBuilder,
    retrieval: RetrievalEvaluator,
    generation: GenerationEvaluator,
}

impl Evaluation {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        config: EvalConfig,
    ) -> Self {
        let scorer = RelevanceScorer::new(embedder.clone());
        let retriever = Retriever::new(embedder, store);
        let templates = QuestionTemplates::for_language(config.question_language);

        let builder = BenchmarkBuilder::new(QaSynthesizer::new(scorer.clone(), templates));
        let retrieval = RetrievalEvaluator::new(retriever.clone(), scorer.clone());
        let engine = RagEngine::new(retriever, generator);
        let generation = GenerationEvaluator::new(engine, scorer, &config);

        Self {
            config,
            builder,
            retrieval,
            generation,
        }
    }

    /// Enable or disable progress bars for every stage.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.builder = self.builder.with_progress(show);
        self.retrieval = self.retrieval.with_progress(show);
        self.generation = self.generation.with_progress(show);
        self
    }

    /// Run the full evaluation and write the report.
    ///
    /// Per-item failures degrade to zero rows; only benchmark construction
    /// and artifact I/O can fail the run.
    pub async fn run(
        &self,
        options: &RunOptions,
        session: &mut ChatSession,
    ) -> Result<EvaluationReport> {
        let mut rng = seeded_rng(self.config.seed);

        let benchmark = match &options.dataset {
            Some(path) => {
                let items = load_benchmark(path)?;
                info!(items = items.len(), "loaded benchmark from {}", path.display());
                Benchmark::from_items(items)
            }
            None => {
                let benchmark = self
                    .builder
                    .build(
                        &options.corpus_path,
                        self.config.questions_per_document,
                        &mut rng,
                    )
                    .await?;
                save_benchmark(&benchmark.items, &options.dataset_output)?;
                info!(
                    items = benchmark.len(),
                    "benchmark saved to {}",
                    options.dataset_output.display()
                );
                benchmark
            }
        };

        let retrieval_summary = self
            .retrieval
            .evaluate(&benchmark.items, self.config.retrieval_top_k)
            .await;

        let sample_size = self.config.generation_sample_size.min(benchmark.len());
        let sample: Vec<_> = index::sample(&mut rng, benchmark.len(), sample_size)
            .into_iter()
            .map(|i| benchmark.items[i].clone())
            .collect();

        let generation_summary = self.generation.evaluate(session, &sample).await;

        let report = EvaluationReport::new(
            DatasetInfo {
                total_qa_pairs: benchmark.len(),
                evaluation_sample_size: sample.len(),
                corpus_files_processed: benchmark.files_processed,
            },
            retrieval_summary,
            generation_summary,
        );

        save_report(&report, &options.report_output)?;
        info!("report saved to {}", options.report_output.display());
        Ok(report)
    }
}
