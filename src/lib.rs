//! RAG Evaluator - retrieval-augmented answering over an encyclopedic corpus,
//! and an offline harness that scores it.
//!
//! # Overview
//!
//! The online path embeds a question, retrieves the nearest corpus
//! paragraphs from a vector index and asks a chat model to answer from them.
//! The evaluation path:
//! 1. Synthesizes a question/answer benchmark from the corpus
//! 2. Scores retrieval (precision, recall, MRR, hit rate)
//! 3. Scores generated answers (BLEU, ROUGE, semantic similarity,
//!    faithfulness, answer relevancy)
//! 4. Aggregates everything into one report
//!
//! # Quick Start
//!
//! ```no_run
//! use rag_evaluator::{
//!     config::Config,
//!     embedding,
//!     eval::{Evaluation, RunOptions},
//!     index,
//!     llm::LlmClient,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     config.validate()?;
//!
//!     let embedder = embedding::from_config(&config.embedding)?;
//!     let store = index::from_config(&config.index)?;
//!     let client = LlmClient::new(config.llm.clone());
//!     let mut session = client.new_session();
//!
//!     let evaluation = Evaluation::new(embedder, store, Arc::new(client), config.eval.clone());
//!     let options = RunOptions {
//!         corpus_path: config.corpus_path.clone(),
//!         dataset: None,
//!         dataset_output: "generated_qa_dataset.json".into(),
//!         report_output: "evaluation_results.json".into(),
//!     };
//!     let report = evaluation.run(&options, &mut session).await?;
//!     report.print_summary();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Embedder / VectorStore / Generator**: seams to the external services
//! - **Retriever**: text search over a vector store
//! - **RagEngine**: retrieval + prompt + generation
//! - **ChatSession**: bounded conversational history, owned by the caller
//! - **eval**: benchmark synthesis, the two evaluators and the report

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod eval;
pub mod index;
pub mod llm;
pub mod persistence;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use corpus::Document;
pub use engine::RagEngine;
pub use error::{RagEvalError, Result};
pub use eval::{BenchmarkItem, Evaluation, EvaluationReport, RunOptions};
pub use index::{CorpusIndexer, Retriever};
pub use llm::{ChatSession, LlmClient};
