use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::queries::QueryType;
use super::EvaluationError;
use crate::citation::{CitationValidity, EvidenceHandling, Groundedness};

/// Scores for one successfully answered query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    pub query_id: String,
    pub query_type: QueryType,
    pub query_text: String,
    pub answer: String,
    pub latency_ms: f64,
    pub num_chunks_retrieved: usize,
    pub retrieved_sources: Vec<String>,
    pub expected_sources: Vec<String>,
    pub source_recall: Option<f64>,
    pub citation_validity: CitationValidity,
    pub groundedness: Groundedness,
    pub evidence_handling: EvidenceHandling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub query_id: String,
    pub query_type: QueryType,
    pub query_text: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Success(QueryEvaluation),
    Failure(QueryFailure),
}

impl QueryOutcome {
    pub fn query_id(&self) -> &str {
        match self {
            QueryOutcome::Success(eval) => &eval.query_id,
            QueryOutcome::Failure(failure) => &failure.query_id,
        }
    }

    pub fn as_success(&self) -> Option<&QueryEvaluation> {
        match self {
            QueryOutcome::Success(eval) => Some(eval),
            QueryOutcome::Failure(_) => None,
        }
    }
}

/// Averages over successful queries; `None` when there is nothing to average.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub avg_citation_precision: Option<f64>,
    pub avg_groundedness: Option<f64>,
    /// Only queries with expected sources contribute.
    pub avg_source_recall: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvidenceMissingSummary {
    pub should_flag: usize,
    pub correctly_flagged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub count: usize,
    pub avg_citation_precision: f64,
    pub avg_groundedness: f64,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub run_timestamp: DateTime<Utc>,
    pub total_queries: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time_s: f64,
    pub aggregate_metrics: AggregateMetrics,
    pub evidence_missing: EvidenceMissingSummary,
    pub by_type: BTreeMap<QueryType, TypeBreakdown>,
    pub results: Vec<QueryOutcome>,
}

impl EvalReport {
    pub fn from_outcomes(results: Vec<QueryOutcome>, total_time_s: f64, run_timestamp: DateTime<Utc>) -> Self {
        let successful: Vec<&QueryEvaluation> = results.iter().filter_map(QueryOutcome::as_success).collect();

        let aggregate_metrics = AggregateMetrics {
            avg_citation_precision: mean(successful.iter().map(|r| r.citation_validity.citation_precision)),
            avg_groundedness: mean(successful.iter().map(|r| r.groundedness.groundedness_score)),
            avg_source_recall: mean(successful.iter().filter_map(|r| r.source_recall)),
        };

        let mut evidence_missing = EvidenceMissingSummary::default();
        for eval in successful.iter().filter(|r| r.query_type == QueryType::EdgeCase) {
            if eval.evidence_handling.should_flag_missing {
                evidence_missing.should_flag += 1;
                if eval.evidence_handling.correctly_flags_missing == Some(true) {
                    evidence_missing.correctly_flagged += 1;
                }
            }
        }

        let mut by_type = BTreeMap::new();
        for query_type in [QueryType::Direct, QueryType::Synthesis, QueryType::EdgeCase] {
            let typed: Vec<&&QueryEvaluation> = successful.iter().filter(|r| r.query_type == query_type).collect();
            if typed.is_empty() {
                continue;
            }
            let count = typed.len() as f64;
            by_type.insert(
                query_type,
                TypeBreakdown {
                    count: typed.len(),
                    avg_citation_precision: typed.iter().map(|r| r.citation_validity.citation_precision).sum::<f64>()
                        / count,
                    avg_groundedness: typed.iter().map(|r| r.groundedness.groundedness_score).sum::<f64>() / count,
                    avg_latency_ms: typed.iter().map(|r| r.latency_ms).sum::<f64>() / count,
                },
            );
        }

        let successful_count = successful.len();
        Self {
            run_timestamp,
            total_queries: results.len(),
            successful: successful_count,
            failed: results.len() - successful_count,
            total_time_s,
            aggregate_metrics,
            evidence_missing,
            by_type,
            results,
        }
    }

    /// Writes pretty JSON next to `path` and renames it into place.
    pub fn write_json(&self, path: &Path) -> Result<(), EvaluationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = path.with_extension("json.tmp");
        let f = fs::File::create(&temp_path)?;
        serde_json::to_writer_pretty(&f, self)?;
        f.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self, EvaluationError> {
        let f = fs::File::open(path)?;
        Ok(serde_json::from_reader(f)?)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
