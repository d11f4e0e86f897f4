//! Configuration for the RAG evaluator.
//!
//! Supports both environment variables and a YAML config file.
//! Environment variables take precedence over config file values.
//! A `.env` file in the working directory is loaded into the environment
//! before overrides are applied.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default file name looked up in the working directory.
pub const LOCAL_CONFIG_FILENAME: &str = "config.yaml";

/// LLM (chat completion) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL for an OpenAI-compatible API (e.g., "https://api.groq.com/openai")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Maximum tokens for response
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Number of history messages kept alongside the system prompt.
    pub max_history: usize,

    /// Replaces the built-in grounded-answer system prompt.
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai".to_string(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            max_history: 5,
            system_prompt: None,
        }
    }
}

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-transformers model run in-process (requires `local-embeddings`).
    Local,
    /// OpenAI-compatible `/v1/embeddings` endpoint.
    Api,
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Model id (Hugging Face repo for `local`, model name for `api`).
    pub model: String,
    pub api_base: String,
    pub api_key: String,
    /// Vector dimension produced by the model.
    pub dimension: usize,
    /// Texts per encode call when indexing.
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            api_base: String::new(),
            api_key: String::new(),
            dimension: 384,
            batch_size: 8,
        }
    }
}

/// Which vector store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    /// Hosted Pinecone index, addressed by its data-plane host.
    Pinecone,
    /// Brute-force store persisted to a local file.
    Local,
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub provider: IndexProvider,
    /// Index name (informational for Pinecone, used in log output).
    pub name: String,
    /// Pinecone data-plane host, e.g. "https://wiki-abc123.svc.aped-1234.pinecone.io"
    pub host: String,
    pub api_key: String,
    /// Optional Pinecone namespace.
    pub namespace: Option<String>,
    /// Path of the local store file (`.json` or `.bin`).
    pub local_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: IndexProvider::Local,
            name: "wiki-rag".to_string(),
            host: String::new(),
            api_key: String::new(),
            namespace: None,
            local_path: PathBuf::from("data/vector_store.bin"),
        }
    }
}

/// Language of the question template bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionLanguage {
    En,
    Vi,
}

/// Evaluation harness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Synthetic questions drawn per corpus document.
    pub questions_per_document: usize,
    /// Results requested per query when scoring retrieval.
    pub retrieval_top_k: usize,
    /// Results used as context when generating an answer.
    pub answer_top_k: usize,
    /// Results concatenated into the faithfulness context.
    pub faithfulness_top_k: usize,
    /// Benchmark items sampled for generation scoring.
    pub generation_sample_size: usize,
    /// Seed for template and sample selection; random when absent.
    pub seed: Option<u64>,
    /// Reset the chat session before every generation item.
    pub isolate_sessions: bool,
    pub question_language: QuestionLanguage,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            questions_per_document: 5,
            retrieval_top_k: 5,
            answer_top_k: 5,
            faithfulness_top_k: 3,
            generation_sample_size: 20,
            seed: None,
            isolate_sessions: true,
            question_language: QuestionLanguage::En,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of corpus JSON files.
    pub corpus_path: PathBuf,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub eval: EvalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/wiki_data"),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            eval: EvalConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and an optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`LLM_API_KEY`, `PINECONE_API_KEY`, ...), including `.env`
    /// 2. Config file (`explicit_path`, else `./config.yaml`, else
    ///    `~/.config/rag-evaluator/config.yaml`)
    /// 3. Default values
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();

        let mut config = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(RagEvalError::Config(format!(
                        "Config file '{}' does not exist",
                        path.display()
                    )));
                }
                Self::load_from_file(path)?
            }
            None => match Self::discover_config_file() {
                Some(path) => Self::load_from_file(&path)?,
                None => Config::default(),
            },
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text. Missing keys take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| RagEvalError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("WIKI_DATA_PATH") {
            self.corpus_path = PathBuf::from(path);
        }

        if let Some(api_base) = lookup("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }
        if let Some(api_key) = lookup("LLM_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
            self.llm.api_key = api_key;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(tokens) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }
        if let Some(temp) = lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }

        if let Some(api_base) = lookup("EMBEDDING_API_BASE") {
            self.embedding.api_base = api_base;
        }
        if let Some(api_key) = lookup("EMBEDDING_API_KEY") {
            self.embedding.api_key = api_key;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Some(host) = lookup("PINECONE_HOST") {
            self.index.host = host;
        }
        if let Some(api_key) = lookup("PINECONE_API_KEY") {
            self.index.api_key = api_key;
        }
    }

    fn discover_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILENAME);
        if local.exists() {
            return Some(local);
        }
        Self::config_file_path().filter(|p| p.exists())
    }

    /// Get the default per-user config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rag-evaluator")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that the chat-completion settings are present.
    pub fn validate_llm(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(RagEvalError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string(),
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(RagEvalError::Config(
                "LLM API key is required. Set LLM_API_KEY (or GROQ_API_KEY) environment variable or add to config file.".to_string(),
            ));
        }

        if self.llm.model.is_empty() {
            return Err(RagEvalError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the embedding backend settings.
    pub fn validate_embedding(&self) -> Result<()> {
        if self.embedding.model.is_empty() {
            return Err(RagEvalError::Config(
                "Embedding model is required. Set EMBEDDING_MODEL environment variable or add to config file.".to_string(),
            ));
        }

        match self.embedding.provider {
            EmbeddingProvider::Local => {
                if !cfg!(feature = "local-embeddings") {
                    return Err(RagEvalError::Config(
                        "embedding.provider is 'local' but this binary was built without the 'local-embeddings' feature".to_string(),
                    ));
                }
            }
            EmbeddingProvider::Api => {
                if self.embedding.api_base.is_empty() {
                    return Err(RagEvalError::Config(
                        "Embedding API base URL is required. Set EMBEDDING_API_BASE environment variable or add to config file.".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate the vector index settings.
    pub fn validate_index(&self) -> Result<()> {
        match self.index.provider {
            IndexProvider::Pinecone => {
                if self.index.api_key.is_empty() {
                    return Err(RagEvalError::Config(
                        "Pinecone API key is required. Set PINECONE_API_KEY environment variable or add to config file.".to_string(),
                    ));
                }
                if self.index.host.is_empty() {
                    return Err(RagEvalError::Config(
                        "Pinecone index host is required. Set PINECONE_HOST environment variable or add to config file.".to_string(),
                    ));
                }
            }
            IndexProvider::Local => {
                if self.index.local_path.as_os_str().is_empty() {
                    return Err(RagEvalError::Config(
                        "index.local_path is required for the local vector store".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate everything the evaluation harness needs.
    pub fn validate(&self) -> Result<()> {
        self.validate_llm()?;
        self.validate_embedding()?;
        self.validate_index()
    }
}
