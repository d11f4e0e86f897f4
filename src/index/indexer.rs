//! Corpus indexing: embed paragraphs and upsert them into a vector store.

use super::{MatchMetadata, VectorRecord, VectorStore};
use crate::corpus::{Document, corpus_files};
use crate::embedding::Embedder;
use crate::error::{RagEvalError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of vectors sent in one upsert request.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Counts reported after indexing a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub passages: usize,
}

/// Builds the retrieval index from corpus files.
pub struct CorpusIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    embed_batch_size: usize,
}

impl CorpusIndexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        embed_batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            embed_batch_size: embed_batch_size.max(1),
        }
    }

    /// Index every document under `corpus_path`, then flush the store.
    pub async fn index_corpus(&self, corpus_path: &Path) -> Result<IndexStats> {
        let files = corpus_files(corpus_path)?;
        info!(files = files.len(), "indexing corpus {}", corpus_path.display());

        let mut stats = IndexStats::default();
        for path in &files {
            let document = Document::from_json_file(path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(document.title.as_str());

            let passages = self.index_document(stem, &document).await?;
            debug!(file = %path.display(), passages, "indexed document");

            stats.documents += 1;
            stats.passages += passages;
        }

        self.store.flush().await?;
        info!(
            documents = stats.documents,
            passages = stats.passages,
            "indexing complete"
        );
        Ok(stats)
    }

    /// Embed and upsert one document's indexable paragraphs.
    ///
    /// Record ids are `{id_prefix}_{n}` with `n` counting indexed paragraphs.
    pub async fn index_document(&self, id_prefix: &str, document: &Document) -> Result<usize> {
        let paragraphs = document.indexable_paragraphs();
        if paragraphs.is_empty() {
            return Ok(0);
        }

        let source = document.source_id();
        let dimension = self.embedder.dimension();
        let mut records = Vec::with_capacity(paragraphs.len());

        for chunk in paragraphs.chunks(self.embed_batch_size) {
            let vectors = self.embedder.encode(chunk).await?;
            if vectors.len() != chunk.len() {
                return Err(RagEvalError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    vectors.len()
                )));
            }

            if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
                return Err(RagEvalError::Embedding(format!(
                    "embedding has {} dimensions, expected {} (check embedding.dimension)",
                    bad.len(),
                    dimension
                )));
            }

            for (text, values) in chunk.iter().zip(vectors) {
                records.push(VectorRecord {
                    id: format!("{}_{}", id_prefix, records.len()),
                    values,
                    metadata: MatchMetadata {
                        text: Some(text.to_string()),
                        file_source: Some(source.clone()),
                    },
                });
            }
        }

        let count = records.len();
        let mut remaining = records.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<_> = remaining.by_ref().take(UPSERT_BATCH_SIZE).collect();
            self.store.upsert(batch).await?;
        }

        Ok(count)
    }
}
