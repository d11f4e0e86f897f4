//! Deterministic in-process fakes for the embedding, index and chat seams.

use crate::embedding::Embedder;
use crate::error::{RagEvalError, Result};
use crate::index::{LocalStore, Match, MatchMetadata, VectorRecord, VectorStore};
use crate::llm::{ChatSession, Generator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const KEYWORD_DIMENSION: usize = 1024;

/// Bag-of-words embedder: each distinct lowercase word gets its own axis.
///
/// Texts sharing no words are orthogonal, identical word bags score 1.0.
#[derive(Default)]
pub struct KeywordEmbedder {
    vocabulary: Mutex<HashMap<String, usize>>,
}

impl KeywordEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vocabulary = self.vocabulary.lock().unwrap();
        let mut vector = vec![0.0; KEYWORD_DIMENSION];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let next = vocabulary.len();
            let axis = *vocabulary.entry(word.to_string()).or_insert(next);
            vector[axis % KEYWORD_DIMENSION] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimension(&self) -> usize {
        KEYWORD_DIMENSION
    }
}

/// Embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn encode(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(RagEvalError::Embedding("embedding service unavailable".into()))
    }

    fn dimension(&self) -> usize {
        KEYWORD_DIMENSION
    }
}

/// An in-memory store holding `passages` in order, ids `p0`, `p1`, ...
///
/// `None` entries are stored without text metadata.
pub async fn store_with_passages(
    embedder: &Arc<dyn Embedder>,
    passages: &[Option<&str>],
) -> Arc<dyn VectorStore> {
    let store = LocalStore::in_memory();
    let mut records = Vec::new();
    for (i, passage) in passages.iter().enumerate() {
        let values = embedder.encode_one(passage.unwrap_or("blank")).await.unwrap();
        records.push(VectorRecord {
            id: format!("p{}", i),
            values,
            metadata: MatchMetadata {
                text: passage.map(str::to_string),
                file_source: None,
            },
        });
    }
    store.upsert(records).await.unwrap();
    Arc::new(store)
}

/// Store whose queries always fail.
pub struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<Match>> {
        Err(RagEvalError::VectorIndex("index unreachable".into()))
    }

    async fn upsert(&self, _records: Vec<VectorRecord>) -> Result<()> {
        Err(RagEvalError::VectorIndex("index unreachable".into()))
    }
}

/// Store that records upsert batches and answers queries with nothing.
#[derive(Default)]
pub struct CountingStore {
    batches: Mutex<Vec<Vec<String>>>,
}

impl CountingStore {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.batches.lock().unwrap().concat()
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<Match>> {
        Ok(Vec::new())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let ids = records.into_iter().map(|r| r.id).collect();
        self.batches.lock().unwrap().push(ids);
        Ok(())
    }
}

/// Generator replying with a fixed answer, failing when the prompt contains
/// any of the configured markers.
pub struct ScriptedGenerator {
    answer: String,
    fail_markers: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail_markers: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, session: &mut ChatSession, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let _ = session.request_messages(prompt);

        if self.fail_markers.iter().any(|m| prompt.contains(m.as_str())) {
            return Err(RagEvalError::LlmApi("rate limited".into()));
        }

        session.record(prompt, self.answer.as_str());
        Ok(self.answer.clone())
    }
}

/// Write a corpus file in the `raw_content` layout.
pub fn write_corpus_file(dir: &Path, name: &str, title: &str, paragraphs: &[&str]) {
    let body = serde_json::json!({
        "url": format!("https://example.org/{}", title),
        "raw_content": { "title": title, "content": paragraphs },
    });
    std::fs::write(dir.join(name), body.to_string()).unwrap();
}
