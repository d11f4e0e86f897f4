//! Corpus documents.
//!
//! Each corpus file is one crawled encyclopedia article stored as JSON:
//!
//! ```json
//! { "raw_content": { "title": "...", "content": ["paragraph 1", "paragraph 2"] } }
//! ```
//!
//! Other top-level keys are ignored.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Paragraphs at or below this stripped length carry no answerable content.
pub const INFORMATIVE_MIN_CHARS: usize = 50;

/// Paragraphs at or below this length are not worth indexing.
pub const INDEXABLE_MIN_CHARS: usize = 5;

/// A titled article with paragraphs in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// File the document was loaded from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CorpusFile {
    raw_content: RawContent,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    title: String,
    content: Vec<String>,
}

impl Document {
    /// Create a document from a title and its paragraphs.
    pub fn new(title: impl Into<String>, paragraphs: Vec<String>) -> Self {
        Self {
            title: title.into(),
            paragraphs,
            source: None,
        }
    }

    /// Load a corpus JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;
        let mut document = Self::from_json_str(&content)
            .map_err(|e| RagEvalError::invalid_document(path, e.to_string()))?;
        document.source = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse the `raw_content` layout from a JSON string.
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: CorpusFile = serde_json::from_str(content)?;
        Ok(Self::new(file.raw_content.title, file.raw_content.content))
    }

    /// Identifier used for provenance: the source path when known, else the title.
    pub fn source_id(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.title.clone())
    }

    /// Paragraphs whose stripped length exceeds [`INFORMATIVE_MIN_CHARS`], in order.
    pub fn informative_paragraphs(&self) -> Vec<&str> {
        self.paragraphs
            .iter()
            .map(String::as_str)
            .filter(|p| is_informative(p))
            .collect()
    }

    /// Paragraphs longer than [`INDEXABLE_MIN_CHARS`], in order.
    pub fn indexable_paragraphs(&self) -> Vec<&str> {
        self.paragraphs
            .iter()
            .map(String::as_str)
            .filter(|p| p.chars().count() > INDEXABLE_MIN_CHARS)
            .collect()
    }
}

/// Whether a paragraph passes the informative-length filter.
///
/// Length is counted in characters so that non-Latin corpora are not
/// favoured by their UTF-8 byte width.
pub fn is_informative(paragraph: &str) -> bool {
    paragraph.trim().chars().count() > INFORMATIVE_MIN_CHARS
}

/// List the `*.json` files directly inside a corpus directory, sorted by path.
pub fn corpus_files(corpus_path: &Path) -> Result<Vec<PathBuf>> {
    if !corpus_path.is_dir() {
        return Err(RagEvalError::InvalidCorpusPath(corpus_path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(corpus_path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(corpus_path).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            RagEvalError::io(path, source)
        })?;

        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
