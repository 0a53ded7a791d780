use std::collections::BTreeSet;

use super::filter::IndexFilter;
use super::RetrievalError;
use crate::document::Metadata;
use crate::types::{ChunkId, RetrievedChunk, SourceId};

/// Text → fixed-length vector.
///
/// Implementations are blocking; any timeout belongs to the implementation.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Nearest-neighbour search over stored chunk records.
///
/// The store is append-only during ingestion and read-only while queried.
pub trait VectorIndex {
    /// Up to `k` chunks matching `filter`, ordered by ascending distance.
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&IndexFilter>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError>;

    /// Metadata of every stored chunk, one entry per chunk.
    fn scan_metadata(&self) -> Result<Vec<(SourceId, Metadata)>, RetrievalError>;

    /// Every chunk id ever stored: the citation universe.
    fn chunk_ids(&self) -> Result<BTreeSet<ChunkId>, RetrievalError>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        (**self).embed(text)
    }
}

impl<V: VectorIndex + ?Sized> VectorIndex for &V {
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&IndexFilter>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        (**self).search(vector, filter, k)
    }

    fn scan_metadata(&self) -> Result<Vec<(SourceId, Metadata)>, RetrievalError> {
        (**self).scan_metadata()
    }

    fn chunk_ids(&self) -> Result<BTreeSet<ChunkId>, RetrievalError> {
        (**self).chunk_ids()
    }
}
