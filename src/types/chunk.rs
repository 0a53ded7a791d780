use serde::{Deserialize, Serialize};

use crate::types::identifiers::{ChunkId, SourceId};

/// A bounded unit of document text; the atomic retrieval and citation target.
///
/// Chunks are produced once by the chunker and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub source_id: SourceId,
    pub section_title: String,
    pub text: String,
    /// 1-based, counted across every section of the parent document.
    pub ordinal: u32,
}

/// A chunk returned by the vector index for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    /// Parent document title, copied from stored metadata.
    pub title: String,
    /// Index distance; lower is closer.
    pub distance: f32,
}

impl RetrievedChunk {
    pub fn chunk_id(&self) -> &ChunkId {
        &self.chunk.chunk_id
    }

    pub fn source_id(&self) -> &SourceId {
        &self.chunk.source_id
    }
}
