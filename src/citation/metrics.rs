use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::parser::extract_chunk_ids;
use crate::types::{ChunkId, RetrievedChunk};

/// Phrases that mark an answer as declaring its evidence insufficient.
pub const EVIDENCE_MISSING_MARKERS: &[&str] = &[
    "evidence missing",
    "not contain",
    "no evidence",
    "insufficient evidence",
];

/// Are the cited chunk ids real chunks of the corpus?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationValidity {
    pub total_citations: usize,
    pub valid_citations: usize,
    pub invalid_citations: usize,
    pub citation_precision: f64,
    pub cited_ids: Vec<String>,
    pub invalid_ids: Vec<String>,
}

/// Did the answer only cite chunks it was actually given?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Groundedness {
    pub is_grounded: bool,
    pub grounded_citations: usize,
    pub ungrounded_citations: usize,
    pub groundedness_score: f64,
    pub ungrounded_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceHandling {
    pub should_flag_missing: bool,
    /// Only computed when `should_flag_missing` is set.
    pub correctly_flags_missing: Option<bool>,
}

/// Every citation occurrence counts, repeats included.
/// Zero citations scores a precision of 0.0.
pub fn citation_validity(answer: &str, universe: &BTreeSet<ChunkId>) -> CitationValidity {
    let cited_ids = extract_chunk_ids(answer);

    let invalid_ids: Vec<String> = cited_ids
        .iter()
        .filter(|id| !universe.contains(id.as_str()))
        .cloned()
        .collect();

    let total_citations = cited_ids.len();
    let invalid_citations = invalid_ids.len();
    let valid_citations = total_citations - invalid_citations;
    let citation_precision = if total_citations == 0 {
        0.0
    } else {
        valid_citations as f64 / total_citations as f64
    };

    CitationValidity {
        total_citations,
        valid_citations,
        invalid_citations,
        citation_precision,
        cited_ids,
        invalid_ids,
    }
}

/// Computed over distinct cited ids. An answer without citations is never
/// grounded and scores 0.0.
pub fn groundedness(answer: &str, retrieved: &[RetrievedChunk]) -> Groundedness {
    let retrieved_ids: BTreeSet<&str> = retrieved.iter().map(|c| c.chunk_id().as_str()).collect();
    let cited_ids: BTreeSet<String> = extract_chunk_ids(answer).into_iter().collect();

    if cited_ids.is_empty() {
        return Groundedness {
            is_grounded: false,
            grounded_citations: 0,
            ungrounded_citations: 0,
            groundedness_score: 0.0,
            ungrounded_ids: Vec::new(),
        };
    }

    let ungrounded_ids: Vec<String> = cited_ids
        .iter()
        .filter(|id| !retrieved_ids.contains(id.as_str()))
        .cloned()
        .collect();
    let ungrounded_citations = ungrounded_ids.len();
    let grounded_citations = cited_ids.len() - ungrounded_citations;

    Groundedness {
        is_grounded: ungrounded_citations == 0,
        grounded_citations,
        ungrounded_citations,
        groundedness_score: grounded_citations as f64 / cited_ids.len() as f64,
        ungrounded_ids,
    }
}

/// A query with no expected sources should be answered with an explicit
/// "no evidence" statement.
pub fn evidence_missing_handling<S: AsRef<str>>(answer: &str, expected_sources: &[S]) -> EvidenceHandling {
    if !expected_sources.is_empty() {
        return EvidenceHandling {
            should_flag_missing: false,
            correctly_flags_missing: None,
        };
    }

    let lowered = answer.to_lowercase();
    let flagged = EVIDENCE_MISSING_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker));

    EvidenceHandling {
        should_flag_missing: true,
        correctly_flags_missing: Some(flagged),
    }
}

/// Share of expected sources that appear among the retrieved chunks;
/// `None` when nothing is expected.
pub fn source_recall<S: AsRef<str>>(expected_sources: &[S], retrieved: &[RetrievedChunk]) -> Option<f64> {
    if expected_sources.is_empty() {
        return None;
    }
    let retrieved_sources: BTreeSet<&str> = retrieved.iter().map(|c| c.source_id().as_str()).collect();
    let hits = expected_sources
        .iter()
        .filter(|s| retrieved_sources.contains(s.as_ref()))
        .count();
    Some(hits as f64 / expected_sources.len() as f64)
}
