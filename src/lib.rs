//! Deterministic chunking, source-diversified retrieval and citation scoring
//! for cited question answering over a small corpus of research papers.
//!
//! `evidence-core` turns titled document sections into bounded, overlapping
//! chunks with stable ids, retrieves them with a per-source cap, and scores
//! generated answers for citation validity and groundedness. Embedding,
//! vector search and text generation are supplied by the caller through
//! traits.

pub mod chunking;
pub mod citation;
pub mod config;
pub mod corpus;
pub mod document;
pub mod evaluation;
pub mod generation;
pub mod retrieval;
pub mod types;
