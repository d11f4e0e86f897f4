//! Benchmark dataset construction from a corpus directory.

use super::synthesizer::QaSynthesizer;
use crate::corpus::{Document, corpus_files};
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One synthesized question with its ground truth and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkItem {
    pub question: String,
    pub reference_answer: String,
    /// The informative paragraph the answer was extracted from.
    #[serde(alias = "relevant_context")]
    pub supporting_context: String,
    #[serde(alias = "title")]
    pub source_title: String,
    /// Path of the corpus file the item came from.
    #[serde(alias = "source_file")]
    pub source_id: String,
}

/// A benchmark together with how many corpus files produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Benchmark {
    pub items: Vec<BenchmarkItem>,
    pub files_processed: usize,
}

impl Benchmark {
    /// Wrap previously stored items, counting distinct sources as files.
    pub fn from_items(items: Vec<BenchmarkItem>) -> Self {
        let files_processed = items
            .iter()
            .map(|item| item.source_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            items,
            files_processed,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Runs the synthesizer over every document in a corpus.
pub struct BenchmarkBuilder {
    synthesizer: QaSynthesizer,
    show_progress: bool,
}

impl BenchmarkBuilder {
    pub fn new(synthesizer: QaSynthesizer) -> Self {
        Self {
            synthesizer,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Synthesize up to `per_document` items from each corpus file.
    ///
    /// Files are visited in name order so a fixed seed reproduces the same
    /// benchmark. Documents without informative paragraphs contribute nothing.
    pub async fn build<R: Rng + ?Sized>(
        &self,
        corpus_path: &Path,
        per_document: usize,
        rng: &mut R,
    ) -> Result<Benchmark> {
        let files = corpus_files(corpus_path)?;
        info!(files = files.len(), "synthesizing benchmark from {}", corpus_path.display());

        let progress = progress_bar(files.len() as u64, self.show_progress);
        let mut items = Vec::new();

        for path in &files {
            let document = Document::from_json_file(path)?;
            progress.set_message(document.title.clone());

            let pairs = self
                .synthesizer
                .synthesize(&document.title, &document.paragraphs, per_document, rng)
                .await?;

            if pairs.is_empty() {
                debug!(file = %path.display(), "no informative paragraphs, skipped");
            }

            let source_id = document.source_id();
            items.extend(pairs.into_iter().map(|pair| BenchmarkItem {
                question: pair.question,
                reference_answer: pair.reference_answer,
                supporting_context: pair.supporting_context,
                source_title: document.title.clone(),
                source_id: source_id.clone(),
            }));
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(items = items.len(), "benchmark ready");

        Ok(Benchmark {
            items,
            files_processed: files.len(),
        })
    }
}

/// Progress bar shared by the evaluation stages; hidden when `visible` is false.
pub(crate) fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::RelevanceScorer;
    use crate::eval::synthesizer::QuestionTemplates;
    use crate::test_support::{KeywordEmbedder, write_corpus_file};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use tempfile::TempDir;

    const LONG_A: &str =
        "Hanoi is the capital of Vietnam. It has been the capital since 1010 with some gaps.";
    const LONG_B: &str =
        "Hue was the seat of the Nguyen emperors. Its citadel is a world heritage site today.";

    fn builder() -> BenchmarkBuilder {
        let scorer = RelevanceScorer::new(Arc::new(KeywordEmbedder::default()));
        BenchmarkBuilder::new(QaSynthesizer::new(scorer, QuestionTemplates::default()))
            .with_progress(false)
    }

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_corpus_file(dir.path(), "a_hanoi.json", "Hanoi", &["Intro", LONG_A]);
        write_corpus_file(dir.path(), "b_empty.json", "Empty", &["tiny", "also tiny"]);
        write_corpus_file(dir.path(), "c_hue.json", "Hue", &[LONG_B]);
        dir
    }

    #[tokio::test]
    async fn test_build_flattens_with_provenance() {
        let dir = corpus();
        let benchmark = builder()
            .build(dir.path(), 2, &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();

        assert_eq!(benchmark.files_processed, 3);
        assert_eq!(benchmark.len(), 4);
        assert!(benchmark.items[..2].iter().all(|i| i.source_title == "Hanoi"));
        assert!(benchmark.items[2..].iter().all(|i| i.source_title == "Hue"));
        assert!(benchmark.items[0].source_id.ends_with("a_hanoi.json"));
        assert!(
            benchmark
                .items
                .iter()
                .all(|i| i.supporting_context == LONG_A || i.supporting_context == LONG_B)
        );
    }

    #[tokio::test]
    async fn test_build_reproducible_with_seed() {
        let dir = corpus();
        let first = builder()
            .build(dir.path(), 3, &mut StdRng::seed_from_u64(11))
            .await
            .unwrap();
        let second = builder()
            .build(dir.path(), 3, &mut StdRng::seed_from_u64(11))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_build_rejects_missing_corpus() {
        let result = builder()
            .build(Path::new("/nonexistent/corpus"), 1, &mut StdRng::seed_from_u64(0))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_item_accepts_legacy_keys() {
        let json = r#"{
            "question": "What is Hue?",
            "reference_answer": "A city.",
            "relevant_context": "Hue is a city in central Vietnam on the Perfume River.",
            "title": "Hue",
            "source_file": "data/hue.json"
        }"#;
        let item: BenchmarkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.source_title, "Hue");
        assert_eq!(item.source_id, "data/hue.json");
        assert!(item.supporting_context.starts_with("Hue is"));
    }

    #[test]
    fn test_from_items_counts_sources() {
        let item = |source: &str| BenchmarkItem {
            question: "q".into(),
            reference_answer: "a".into(),
            supporting_context: "c".into(),
            source_title: "t".into(),
            source_id: source.into(),
        };
        let benchmark = Benchmark::from_items(vec![item("a"), item("a"), item("b")]);
        assert_eq!(benchmark.files_processed, 2);
        assert_eq!(benchmark.len(), 3);
    }
}
