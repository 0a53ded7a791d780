//! Sequential evaluation of a fixed query set.

pub mod queries;
pub mod report;
pub mod run_log;
pub mod runner;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::GenerationError;
use crate::retrieval::RetrievalError;

pub use queries::{load_query_set, EvalQuery, QueryType};
pub use report::{
    AggregateMetrics, EvalReport, EvidenceMissingSummary, QueryEvaluation, QueryFailure, QueryOutcome,
    TypeBreakdown,
};
pub use run_log::{LoggedChunk, RunLog, RunLogEntry};
pub use runner::EvalRunner;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Duplicate query ID: {0}")]
    DuplicateQueryId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Pause between consecutive queries, for rate-limited generation.
    pub inter_query_delay_ms: u64,
    /// Append one JSON line per answered query when set.
    pub run_log_path: Option<PathBuf>,
}

impl EvaluationConfig {
    pub fn v0() -> Self {
        Self {
            inter_query_delay_ms: 0,
            run_log_path: None,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::v0()
    }
}
