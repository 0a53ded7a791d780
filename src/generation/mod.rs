//! The seam to the external text-generation call.

pub mod prompt;

use thiserror::Error;

use crate::types::RetrievedChunk;

pub use prompt::{
    build_user_message, format_chunk, EVIDENCE_MISSING_ANSWER, PROMPT_TEMPLATE_VERSION, SYSTEM_PROMPT,
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation provider error: {0}")]
    Provider(String),
}

/// Produces an answer for `query` from the retrieved chunks.
///
/// Implementations are blocking and own their timeout.
pub trait Generator {
    fn generate(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<String, GenerationError>;

    fn model_id(&self) -> &str {
        "unknown"
    }
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<String, GenerationError> {
        (**self).generate(query, chunks)
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Answers with [`EVIDENCE_MISSING_ANSWER`] when nothing was retrieved,
/// without calling the wrapped generator.
pub struct EvidenceGate<G> {
    inner: G,
}

impl<G: Generator> EvidenceGate<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: Generator> Generator for EvidenceGate<G> {
    fn generate(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<String, GenerationError> {
        if chunks.is_empty() {
            return Ok(EVIDENCE_MISSING_ANSWER.to_string());
        }
        self.inner.generate(query, chunks)
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
