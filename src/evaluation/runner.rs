use std::collections::BTreeSet;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use super::queries::EvalQuery;
use super::report::{EvalReport, QueryEvaluation, QueryFailure, QueryOutcome};
use super::run_log::{RunLog, RunLogEntry};
use super::{EvaluationConfig, EvaluationError};
use crate::citation::{citation_validity, evidence_missing_handling, groundedness, source_recall};
use crate::generation::Generator;
use crate::retrieval::{DiversifiedRetriever, Embedder, RetrievalFilters, VectorIndex};
use crate::types::ChunkId;

/// Runs the query set through retrieval, generation and scoring.
///
/// Queries run strictly one after another so each latency measures a single
/// in-flight request. A failing query is recorded and the run continues.
pub struct EvalRunner<'a, E, V, G> {
    retriever: &'a DiversifiedRetriever<E, V>,
    generator: G,
    config: EvaluationConfig,
}

impl<'a, E, V, G> EvalRunner<'a, E, V, G>
where
    E: Embedder,
    V: VectorIndex,
    G: Generator,
{
    pub fn new(retriever: &'a DiversifiedRetriever<E, V>, generator: G, config: EvaluationConfig) -> Self {
        Self {
            retriever,
            generator,
            config,
        }
    }

    /// Scores citations against every chunk id the index holds.
    pub fn run(&self, queries: &[EvalQuery]) -> Result<EvalReport, EvaluationError> {
        let universe = self.retriever.index().chunk_ids()?;
        Ok(self.run_with_universe(queries, &universe))
    }

    pub fn run_with_universe(&self, queries: &[EvalQuery], universe: &BTreeSet<ChunkId>) -> EvalReport {
        info!(queries = queries.len(), universe = universe.len(), "evaluation started");

        let run_log = self.config.run_log_path.as_ref().map(RunLog::new);
        let delay = Duration::from_millis(self.config.inter_query_delay_ms);
        let run_timestamp = Utc::now();
        let started = Instant::now();
        let mut results = Vec::with_capacity(queries.len());

        for (position, query) in queries.iter().enumerate() {
            if position > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }

            let outcome = match self.evaluate_query(query, universe, run_log.as_ref()) {
                Ok(eval) => {
                    info!(
                        query_id = query.id.as_str(),
                        chunks = eval.num_chunks_retrieved,
                        citations = eval.citation_validity.total_citations,
                        valid = eval.citation_validity.valid_citations,
                        groundedness = eval.groundedness.groundedness_score,
                        latency_ms = eval.latency_ms,
                        "query evaluated"
                    );
                    QueryOutcome::Success(eval)
                }
                Err(err) => {
                    warn!(query_id = query.id.as_str(), error = %err, "query failed");
                    QueryOutcome::Failure(QueryFailure {
                        query_id: query.id.clone(),
                        query_type: query.query_type,
                        query_text: query.query.clone(),
                        error: err.to_string(),
                    })
                }
            };
            results.push(outcome);
        }

        let report = EvalReport::from_outcomes(results, started.elapsed().as_secs_f64(), run_timestamp);
        info!(
            total = report.total_queries,
            successful = report.successful,
            failed = report.failed,
            "evaluation finished"
        );
        report
    }

    fn evaluate_query(
        &self,
        query: &EvalQuery,
        universe: &BTreeSet<ChunkId>,
        run_log: Option<&RunLog>,
    ) -> Result<QueryEvaluation, EvaluationError> {
        let filters = RetrievalFilters::none();

        let started = Instant::now();
        let chunks = self.retriever.retrieve(&query.query, &filters)?;
        let answer = self.generator.generate(&query.query, &chunks)?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some(log) = run_log {
            log.append(&RunLogEntry::new(
                &query.id,
                &query.query,
                &filters,
                &chunks,
                self.generator.model_id(),
                &answer,
                latency_ms,
            ))?;
        }

        let retrieved_sources: BTreeSet<String> = chunks
            .iter()
            .map(|c| c.source_id().as_str().to_string())
            .collect();

        Ok(QueryEvaluation {
            query_id: query.id.clone(),
            query_type: query.query_type,
            query_text: query.query.clone(),
            latency_ms,
            num_chunks_retrieved: chunks.len(),
            retrieved_sources: retrieved_sources.into_iter().collect(),
            expected_sources: query.expected_sources.clone(),
            source_recall: source_recall(query.expected_sources.as_slice(), &chunks),
            citation_validity: citation_validity(&answer, universe),
            groundedness: groundedness(&answer, &chunks),
            evidence_handling: evidence_missing_handling(&answer, query.expected_sources.as_slice()),
            answer,
        })
    }
}
