//! Flat JSON artifacts: the synthesized benchmark and the evaluation report.

use crate::error::{RagEvalError, Result};
use crate::eval::{BenchmarkItem, EvaluationReport};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Default filename for the synthesized benchmark.
pub const DEFAULT_DATASET_FILENAME: &str = "generated_qa_dataset.json";

/// Default filename for the evaluation report.
pub const DEFAULT_REPORT_FILENAME: &str = "evaluation_results.json";

fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RagEvalError::io(parent, e))?;
        }
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RagEvalError::Serialization(e.to_string()))?;
    fs::write(path, json).map_err(|e| RagEvalError::io(path, e))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| {
        RagEvalError::Serialization(format!("Invalid JSON in '{}': {}", path.display(), e))
    })
}

/// Write the benchmark as a JSON array of items.
pub fn save_benchmark(items: &[BenchmarkItem], path: &Path) -> Result<()> {
    save_json(items, path)
}

/// Load a benchmark written by [`save_benchmark`].
pub fn load_benchmark(path: &Path) -> Result<Vec<BenchmarkItem>> {
    load_json(path)
}

pub fn save_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    save_json(report, path)
}

pub fn load_report(path: &Path) -> Result<EvaluationReport> {
    load_json(path)
}
