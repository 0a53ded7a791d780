use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::types::chunk::Chunk;

/// A chunk as persisted alongside its embedding: chunk fields plus the
/// parent document's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub metadata: Metadata,
}

impl ChunkRecord {
    pub fn new(chunk: Chunk, metadata: Metadata) -> Self {
        Self { chunk, metadata }
    }
}
