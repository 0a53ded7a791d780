//! Citation extraction and answer scoring.
//!
//! A citation is *valid* when its chunk id exists anywhere in the corpus and
//! *grounded* when it was among the chunks retrieved for the query.

pub mod metrics;
pub mod parser;

pub use metrics::{
    citation_validity, evidence_missing_handling, groundedness, source_recall, CitationValidity,
    EvidenceHandling, Groundedness, EVIDENCE_MISSING_MARKERS,
};
pub use parser::{extract_chunk_ids, extract_citations, Citation, CitationForm};
