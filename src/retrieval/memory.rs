use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::filter::IndexFilter;
use super::service::{Embedder, VectorIndex};
use super::{RetrievalConfig, RetrievalError};
use crate::document::{ChunkRecord, Metadata};
use crate::types::{ChunkId, RetrievedChunk, SourceId};

#[derive(Debug, Clone)]
struct IndexedChunk {
    record: ChunkRecord,
    embedding: Vec<f32>,
}

/// Brute-force cosine index held in memory.
///
/// Distance is `1 - cosine`; ties are broken by ascending chunk id so
/// results are reproducible.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    entries: Vec<IndexedChunk>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds every record with the document prompt and stores it.
    pub fn from_records<E: Embedder>(
        records: Vec<ChunkRecord>,
        embedder: &E,
        config: &RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        let mut index = Self::new();
        for record in records {
            let prompted = document_prompt(record.metadata.title(), &record.chunk.text);
            let mut embedding = embedder.embed(&prompted)?;
            if let Some(dim) = config.embedding_dim {
                embedding.truncate(dim);
            }
            index.insert(record, embedding)?;
        }
        Ok(index)
    }

    /// Appends one record. Chunk ids must be unique and every vector must
    /// share the dimension of the first.
    pub fn insert(&mut self, record: ChunkRecord, embedding: Vec<f32>) -> Result<(), RetrievalError> {
        if let Some(first) = self.entries.first() {
            if first.embedding.len() != embedding.len() {
                return Err(RetrievalError::Index(format!(
                    "embedding dimension {} does not match index dimension {}",
                    embedding.len(),
                    first.embedding.len()
                )));
            }
        }
        if self
            .entries
            .iter()
            .any(|e| e.record.chunk.chunk_id == record.chunk.chunk_id)
        {
            return Err(RetrievalError::Index(format!(
                "duplicate chunk id {}",
                record.chunk.chunk_id
            )));
        }
        self.entries.push(IndexedChunk { record, embedding });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VectorIndex for InMemoryIndex {
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&IndexFilter>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let mut scored = Vec::new();
        for entry in &self.entries {
            let chunk = &entry.record.chunk;
            if let Some(filter) = filter {
                if !filter.matches(&chunk.source_id, &entry.record.metadata) {
                    continue;
                }
            }
            if entry.embedding.len() != vector.len() {
                return Err(RetrievalError::Index(format!(
                    "query dimension {} does not match index dimension {}",
                    vector.len(),
                    entry.embedding.len()
                )));
            }
            let distance = 1.0 - cosine_similarity(vector, &entry.embedding);
            scored.push((distance, entry));
        }

        scored.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.record.chunk.chunk_id.cmp(&b.record.chunk.chunk_id))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, entry)| RetrievedChunk {
                chunk: entry.record.chunk.clone(),
                title: entry.record.metadata.title().to_string(),
                distance,
            })
            .collect())
    }

    fn scan_metadata(&self) -> Result<Vec<(SourceId, Metadata)>, RetrievalError> {
        Ok(self
            .entries
            .iter()
            .map(|e| (e.record.chunk.source_id.clone(), e.record.metadata.clone()))
            .collect())
    }

    fn chunk_ids(&self) -> Result<BTreeSet<ChunkId>, RetrievalError> {
        Ok(self
            .entries
            .iter()
            .map(|e| e.record.chunk.chunk_id.clone())
            .collect())
    }
}

/// Prompt wrapped around chunk text before it is embedded for storage.
pub fn document_prompt(title: &str, text: &str) -> String {
    let title = if title.is_empty() { "none" } else { title };
    format!("title: {title} | text: {text}")
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > f32::EPSILON && norm_b > f32::EPSILON {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
