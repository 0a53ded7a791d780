use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EvaluationError;
use crate::generation::PROMPT_TEMPLATE_VERSION;
use crate::retrieval::RetrievalFilters;
use crate::types::RetrievedChunk;

const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedChunk {
    pub chunk_id: String,
    pub source_id: String,
    pub title: String,
    pub section_title: String,
    pub distance: f32,
    pub text_snippet: String,
}

impl LoggedChunk {
    pub fn from_retrieved(chunk: &RetrievedChunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id().as_str().to_string(),
            source_id: chunk.source_id().as_str().to_string(),
            title: chunk.title.clone(),
            section_title: chunk.chunk.section_title.clone(),
            distance: chunk.distance,
            text_snippet: chunk.chunk.text.chars().take(SNIPPET_CHARS).collect(),
        }
    }
}

/// One answered query, as appended to the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Utc>,
    pub query_id: String,
    pub query_text: String,
    pub metadata_filters: RetrievalFilters,
    pub retrieved_chunks: Vec<LoggedChunk>,
    pub prompt_template_version: String,
    pub model_id: String,
    pub generated_answer: String,
    pub latency_ms: f64,
}

impl RunLogEntry {
    pub fn new(
        query_id: &str,
        query_text: &str,
        filters: &RetrievalFilters,
        chunks: &[RetrievedChunk],
        model_id: &str,
        answer: &str,
        latency_ms: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            query_id: query_id.to_string(),
            query_text: query_text.to_string(),
            metadata_filters: filters.clone(),
            retrieved_chunks: chunks.iter().map(LoggedChunk::from_retrieved).collect(),
            prompt_template_version: PROMPT_TEMPLATE_VERSION.to_string(),
            model_id: model_id.to_string(),
            generated_answer: answer.to_string(),
            latency_ms,
        }
    }
}

/// Append-only JSON-lines log of answered queries.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &RunLogEntry) -> Result<(), EvaluationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        f.write_all(&line)?;
        Ok(())
    }
}
