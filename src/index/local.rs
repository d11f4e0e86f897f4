//! Brute-force vector store persisted to a single file.
//!
//! Supports both JSON (human-readable) and bincode (compact binary) formats,
//! chosen by file extension. Every query scans all records, which is fine for
//! a corpus of a few thousand paragraphs.

use super::{Match, VectorRecord, VectorStore};
use crate::embedding::cosine_similarity;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Save format for the store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

#[derive(Default)]
struct Records {
    items: Vec<VectorRecord>,
    /// id -> position in `items`
    positions: HashMap<String, usize>,
}

impl Records {
    fn from_items(items: Vec<VectorRecord>) -> Self {
        let mut records = Records::default();
        for item in items {
            records.upsert(item);
        }
        records
    }

    fn upsert(&mut self, record: VectorRecord) {
        match self.positions.get(&record.id) {
            Some(&pos) => self.items[pos] = record,
            None => {
                self.positions.insert(record.id.clone(), self.items.len());
                self.items.push(record);
            }
        }
    }
}

/// In-memory cosine-similarity store with optional file backing.
pub struct LocalStore {
    path: Option<PathBuf>,
    records: RwLock<Records>,
}

impl LocalStore {
    /// An empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(Records::default()),
        }
    }

    /// Open a store file, starting empty if it does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        let items = if path.exists() {
            load_records(path)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            records: RwLock::new(Records::from_items(items)),
        })
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.items.is_empty()
    }
}

fn load_records(path: &Path) -> Result<Vec<VectorRecord>> {
    let data = fs::read(path).map_err(|e| RagEvalError::io(path, e))?;

    match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::from_slice(&data)
            .map_err(|e| RagEvalError::Serialization(format!("Invalid store JSON: {}", e))),
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            let (records, _): (Vec<VectorRecord>, usize) =
                bincode::serde::decode_from_slice(&data, config)
                    .map_err(|e| RagEvalError::Serialization(e.to_string()))?;
            Ok(records)
        }
    }
}

fn save_records(records: &[VectorRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RagEvalError::io(parent, e))?;
        }
    }

    let data = match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::to_vec_pretty(records)
            .map_err(|e| RagEvalError::Serialization(e.to_string()))?,
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            bincode::serde::encode_to_vec(records, config)
                .map_err(|e| RagEvalError::Serialization(e.to_string()))?
        }
    };

    fs::write(path, &data).map_err(|e| RagEvalError::io(path, e))
}

#[async_trait]
impl VectorStore for LocalStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Match>> {
        let records = self.records.read().await;

        let mut results: Vec<Match> = records
            .items
            .iter()
            .map(|record| Match {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn upsert(&self, batch: Vec<VectorRecord>) -> Result<()> {
        let mut records = self.records.write().await;
        for record in batch {
            records.upsert(record);
        }
        Ok(())
    }

    /// Write the records to the backing file, if any.
    async fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let records = self.records.read().await;
        save_records(&records.items, path)
    }
}
