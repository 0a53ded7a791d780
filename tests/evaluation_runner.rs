use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;

use evidence_core::document::{ChunkRecord, Metadata};
use evidence_core::evaluation::{
    load_query_set, EvalQuery, EvalReport, EvalRunner, EvaluationConfig, EvaluationError, QueryOutcome, QueryType,
    RunLogEntry,
};
use evidence_core::generation::{EvidenceGate, GenerationError, Generator, EVIDENCE_MISSING_ANSWER};
use evidence_core::retrieval::{DiversifiedRetriever, Embedder, InMemoryIndex, RetrievalConfig, RetrievalError};
use evidence_core::types::{Chunk, ChunkId, RetrievedChunk, SourceId};
use tempfile::tempdir;

struct UnitEmbedder;

impl Embedder for UnitEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Ok(vec![1.0, 0.0])
    }
}

/// Answers from a fixed script keyed by query text; unknown queries fail.
struct ScriptedGenerator {
    answers: BTreeMap<String, String>,
    calls: Cell<usize>,
}

impl ScriptedGenerator {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs.iter().map(|(q, a)| (q.to_string(), a.to_string())).collect(),
            calls: Cell::new(0),
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, query: &str, _chunks: &[RetrievedChunk]) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        self.answers
            .get(query)
            .cloned()
            .ok_or_else(|| GenerationError::Provider(format!("rate limited on {query:?}")))
    }

    fn model_id(&self) -> &str {
        "scripted-v1"
    }
}

fn record(source: &str, ordinal: u32, tilt: f32) -> (ChunkRecord, Vec<f32>) {
    let source_id = SourceId::new(source).unwrap();
    let chunk = Chunk {
        chunk_id: ChunkId::new(&source_id, ordinal),
        source_id,
        section_title: "Body".into(),
        text: format!("Evidence from {source}, part {ordinal}."),
        ordinal,
    };
    let meta = Metadata::for_paper(format!("{source} paper"), 2024, "paper", ["Ada Lovelace"]);
    (ChunkRecord::new(chunk, meta), vec![1.0, tilt])
}

fn fixture_retriever() -> DiversifiedRetriever<UnitEmbedder, InMemoryIndex> {
    let mut index = InMemoryIndex::new();
    for (source, ordinal, tilt) in [
        ("alpha", 1, 0.0),
        ("alpha", 2, 0.1),
        ("alpha", 3, 0.2),
        ("beta", 1, 0.3),
        ("gamma", 1, 0.9),
    ] {
        let (rec, vector) = record(source, ordinal, tilt);
        index.insert(rec, vector).unwrap();
    }
    let config = RetrievalConfig {
        top_k: 3,
        max_per_source: 2,
        query_prefix: String::new(),
        embedding_dim: None,
    };
    DiversifiedRetriever::new(UnitEmbedder, index, config)
}

fn query(id: &str, query_type: QueryType, text: &str, expected: &[&str]) -> EvalQuery {
    EvalQuery {
        id: id.into(),
        query_type,
        query: text.into(),
        expected_sources: expected.iter().map(|s| s.to_string()).collect(),
    }
}

fn fixture_queries() -> Vec<EvalQuery> {
    vec![
        query("q1", QueryType::Direct, "what does alpha show", &["alpha"]),
        query("q2", QueryType::Direct, "this one fails", &["alpha"]),
        query("q3", QueryType::Synthesis, "compare alpha and gamma", &["alpha", "gamma"]),
        query("q4", QueryType::EdgeCase, "unanswerable", &[]),
    ]
}

fn fixture_generator() -> ScriptedGenerator {
    ScriptedGenerator::new(&[
        ("what does alpha show", "Alpha shows X [alpha, alpha_c01] and Y [alpha, alpha_c02]."),
        (
            "compare alpha and gamma",
            "Alpha [alpha, alpha_c03] differs from beta [beta, beta_c01]; see also [x, missing_c09].",
        ),
        ("unanswerable", "The corpus has insufficient evidence for this."),
    ])
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn failing_query_is_isolated_and_run_continues() {
    let retriever = fixture_retriever();
    let generator = fixture_generator();
    let runner = EvalRunner::new(&retriever, &generator, EvaluationConfig::v0());

    let report = runner.run(&fixture_queries()).unwrap();

    assert_eq!(report.total_queries, 4);
    assert_eq!(report.successful, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(generator.calls.get(), 4);

    let ids: Vec<&str> = report.results.iter().map(QueryOutcome::query_id).collect();
    assert_eq!(ids, vec!["q1", "q2", "q3", "q4"]);

    match &report.results[1] {
        QueryOutcome::Failure(failure) => {
            assert_eq!(failure.query_type, QueryType::Direct);
            assert!(failure.error.contains("rate limited"));
        }
        QueryOutcome::Success(_) => panic!("q2 should have failed"),
    }
}

#[test]
fn per_query_scores() {
    let retriever = fixture_retriever();
    let runner = EvalRunner::new(&retriever, fixture_generator(), EvaluationConfig::v0());

    let report = runner.run(&fixture_queries()).unwrap();

    let q1 = report.results[0].as_success().unwrap();
    assert_eq!(q1.num_chunks_retrieved, 3);
    assert_eq!(q1.retrieved_sources, vec!["alpha", "beta"]);
    assert_eq!(q1.citation_validity.citation_precision, 1.0);
    assert!(q1.groundedness.is_grounded);
    assert_eq!(q1.source_recall, Some(1.0));
    assert!(!q1.evidence_handling.should_flag_missing);
    assert!(q1.latency_ms >= 0.0);

    let q3 = report.results[2].as_success().unwrap();
    assert_eq!(q3.citation_validity.total_citations, 3);
    assert_eq!(q3.citation_validity.valid_citations, 2);
    assert_eq!(q3.citation_validity.invalid_ids, vec!["missing_c09"]);
    assert!(approx(q3.groundedness.groundedness_score, 1.0 / 3.0));
    assert_eq!(q3.groundedness.ungrounded_ids, vec!["alpha_c03", "missing_c09"]);
    assert_eq!(q3.source_recall, Some(0.5));

    let q4 = report.results[3].as_success().unwrap();
    assert_eq!(q4.citation_validity.citation_precision, 0.0);
    assert!(!q4.groundedness.is_grounded);
    assert_eq!(q4.source_recall, None);
    assert!(q4.evidence_handling.should_flag_missing);
    assert_eq!(q4.evidence_handling.correctly_flags_missing, Some(true));
}

#[test]
fn aggregates_cover_successful_queries_only() {
    let retriever = fixture_retriever();
    let runner = EvalRunner::new(&retriever, fixture_generator(), EvaluationConfig::v0());

    let report = runner.run(&fixture_queries()).unwrap();
    let aggregates = report.aggregate_metrics;

    assert!(approx(aggregates.avg_citation_precision.unwrap(), (1.0 + 2.0 / 3.0 + 0.0) / 3.0));
    assert!(approx(aggregates.avg_groundedness.unwrap(), (1.0 + 1.0 / 3.0 + 0.0) / 3.0));
    assert!(approx(aggregates.avg_source_recall.unwrap(), 0.75));

    assert_eq!(report.evidence_missing.should_flag, 1);
    assert_eq!(report.evidence_missing.correctly_flagged, 1);

    assert_eq!(report.by_type[&QueryType::Direct].count, 1);
    assert_eq!(report.by_type[&QueryType::Synthesis].count, 1);
    assert_eq!(report.by_type[&QueryType::EdgeCase].count, 1);
    assert!(approx(report.by_type[&QueryType::Direct].avg_groundedness, 1.0));
}

#[test]
fn empty_run_has_no_aggregates() {
    let retriever = fixture_retriever();
    let runner = EvalRunner::new(&retriever, fixture_generator(), EvaluationConfig::v0());

    let report = runner.run(&[]).unwrap();

    assert_eq!(report.total_queries, 0);
    assert_eq!(report.aggregate_metrics.avg_citation_precision, None);
    assert_eq!(report.aggregate_metrics.avg_groundedness, None);
    assert_eq!(report.aggregate_metrics.avg_source_recall, None);
    assert!(report.by_type.is_empty());
}

#[test]
fn report_persists_and_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eval").join("eval_results.json");
    let retriever = fixture_retriever();
    let runner = EvalRunner::new(&retriever, fixture_generator(), EvaluationConfig::v0());

    let report = runner.run(&fixture_queries()).unwrap();
    report.write_json(&path).unwrap();

    let reloaded = EvalReport::read_json(&path).unwrap();
    assert_eq!(reloaded, report);
    assert!(!path.with_extension("json.tmp").exists());

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"edge_case\""));
    assert!(raw.contains("\"error\""));
}

#[test]
fn run_log_records_answered_queries() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("logs").join("run_logs.jsonl");
    let config = EvaluationConfig {
        inter_query_delay_ms: 1,
        run_log_path: Some(log_path.clone()),
    };
    let retriever = fixture_retriever();
    let runner = EvalRunner::new(&retriever, fixture_generator(), config);

    runner.run(&fixture_queries()).unwrap();

    let raw = fs::read_to_string(&log_path).unwrap();
    let entries: Vec<RunLogEntry> = raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].query_id, "q1");
    assert_eq!(entries[0].model_id, "scripted-v1");
    assert_eq!(entries[0].prompt_template_version, "v2");
    assert_eq!(entries[0].retrieved_chunks.len(), 3);
    assert_eq!(entries[0].retrieved_chunks[0].chunk_id, "alpha_c01");
}

#[test]
fn evidence_gate_answers_without_calling_generator() {
    let inner = ScriptedGenerator::new(&[]);
    let gate = EvidenceGate::new(&inner);

    let answer = gate.generate("anything", &[]).unwrap();

    assert_eq!(answer, EVIDENCE_MISSING_ANSWER);
    assert_eq!(inner.calls.get(), 0);
    assert_eq!(gate.model_id(), "scripted-v1");
}

#[test]
fn query_set_loads_from_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queries.json");
    fs::write(
        &path,
        r#"[
          {"id": "d1", "type": "direct", "query": "What is GCG?", "expected_sources": ["gcg"]},
          {"id": "e1", "type": "edge_case", "query": "Who won the 1998 World Cup?"}
        ]"#,
    )
    .unwrap();

    let queries = load_query_set(&path).unwrap();

    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].query_type, QueryType::Direct);
    assert_eq!(queries[0].expected_sources, vec!["gcg"]);
    assert_eq!(queries[1].query_type, QueryType::EdgeCase);
    assert!(queries[1].expected_sources.is_empty());
}

#[test]
fn query_set_rejects_duplicate_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queries.json");
    fs::write(
        &path,
        r#"[
          {"id": "d1", "type": "direct", "query": "a"},
          {"id": "d1", "type": "synthesis", "query": "b"}
        ]"#,
    )
    .unwrap();

    let err = load_query_set(&path).unwrap_err();

    assert!(matches!(err, EvaluationError::DuplicateQueryId(id) if id == "d1"));
}

#[test]
fn floats_reload_bit_identical() {
    let values: Vec<f64> = (1..20_000u32)
        .map(|i| f64::from(i) * 0.731 + 1.0 / f64::from(i))
        .collect();

    let raw = serde_json::to_string(&values).unwrap();
    let reloaded: Vec<f64> = serde_json::from_str(&raw).unwrap();

    assert_eq!(reloaded, values);
}
