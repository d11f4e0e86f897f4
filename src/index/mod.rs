//! Vector index access.
//!
//! The evaluator only needs two operations from a vector store: rank-ordered
//! top-k queries and batch upserts. [`Retriever`] pairs a store with the
//! embedder that produced its vectors so callers can search by text.

mod indexer;
mod local;
mod pinecone;

pub use indexer::{CorpusIndexer, IndexStats, UPSERT_BATCH_SIZE};
pub use local::{LocalStore, SaveFormat};
pub use pinecone::PineconeStore;

use crate::config::{IndexConfig, IndexProvider};
use crate::embedding::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file_source: Option<String>,
}

/// A vector to upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: MatchMetadata,
}

/// One query result. Results are returned best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

impl Match {
    /// The passage text, if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.metadata.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// A nearest-neighbour index over embedded passages.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The `top_k` nearest records to `vector`, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>>;

    /// Insert or replace records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Persist buffered writes. Remote stores write through on upsert.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Open the store selected by configuration.
pub fn from_config(config: &IndexConfig) -> Result<Arc<dyn VectorStore>> {
    match config.provider {
        IndexProvider::Pinecone => Ok(Arc::new(PineconeStore::new(config.clone()))),
        IndexProvider::Local => Ok(Arc::new(LocalStore::open(&config.local_path)?)),
    }
}

/// Text search over a vector store.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed `query` and return the store's top-k matches in rank order.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Match>> {
        let vector = self.embedder.encode_one(query).await?;
        self.store.query(&vector, top_k).await
    }

    /// Texts of the top-k matches that carry non-empty text, in rank order.
    pub async fn search_texts(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let matches = self.search(query, top_k).await?;
        Ok(matches
            .iter()
            .filter_map(|m| m.text().map(str::to_string))
            .collect())
    }
}
