//! Error types for the RAG evaluator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagEvalError>;

/// Errors that can occur while indexing, answering or evaluating.
#[derive(Error, Debug)]
pub enum RagEvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The corpus directory does not exist or is not a directory.
    #[error("Corpus path '{0}' does not exist or is not a directory")]
    InvalidCorpusPath(PathBuf),

    /// A corpus file does not have the expected `raw_content` shape.
    #[error("Invalid corpus document '{path}': {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// Configuration file error or missing required setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Embedding model failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index query or upsert failure.
    #[error("Vector index error: {0}")]
    VectorIndex(String),
}

impl RagEvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid document error.
    pub fn invalid_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for RagEvalError {
    fn from(err: reqwest::Error) -> Self {
        RagEvalError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagEvalError {
    fn from(err: serde_json::Error) -> Self {
        RagEvalError::LlmParse(err.to_string())
    }
}
