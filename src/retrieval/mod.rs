//! Source-diversified nearest-neighbour retrieval.
//!
//! The embedder and the vector index are capabilities supplied by the
//! caller; [`InMemoryIndex`] is a brute-force implementation of the latter.

pub mod diversify;
pub mod filter;
pub mod memory;
pub mod retriever;
pub mod service;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

pub use diversify::{diversify, OVERSAMPLE_FACTOR};
pub use filter::{sources_by_author, FilterPlan, IndexFilter, RetrievalFilters};
pub use memory::{document_prompt, InMemoryIndex};
pub use retriever::DiversifiedRetriever;
pub use service::{Embedder, VectorIndex};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding failed: {0}")]
    Embedding(String),
    #[error("Vector index error: {0}")]
    Index(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_per_source: usize,
    /// Prepended to the query text before embedding.
    pub query_prefix: String,
    /// Vectors longer than this are truncated.
    pub embedding_dim: Option<usize>,
}

impl RetrievalConfig {
    pub fn v0() -> Self {
        Self {
            top_k: 8,
            max_per_source: 3,
            query_prefix: "task: search result | query: ".into(),
            embedding_dim: Some(768),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("retrieval.top_k must be positive".into()));
        }
        if self.max_per_source == 0 {
            return Err(ConfigError::Invalid("retrieval.max_per_source must be positive".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(ConfigError::Invalid("retrieval.embedding_dim must be positive".into()));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::v0()
    }
}
