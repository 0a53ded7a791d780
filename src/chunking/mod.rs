//! Boundary-aware section chunking.
//!
//! Chunking is a pure function of `(sections, source_id, config)`: the same
//! input always yields the same chunks and the same chunk ids. The ordinal
//! counter lives on the stack of each call, so distinct documents can be
//! chunked on separate threads.

pub mod sentences;
pub mod windowing;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::document::{ChunkRecord, PaperDocument, Section};
use crate::types::{Chunk, ChunkId, SourceId};

pub use sentences::split_sentences;
pub use windowing::split_section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl ChunkingConfig {
    /// 1024 tokens per chunk and 100 tokens of overlap at ~4 chars per token.
    pub fn v0() -> Self {
        Self {
            max_chars: 4096,
            overlap_chars: 400,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chars == 0 {
            return Err(ConfigError::Invalid("chunking.max_chars must be positive".into()));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(ConfigError::Invalid(format!(
                "chunking.overlap_chars ({}) must be smaller than max_chars ({})",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::v0()
    }
}

/// Turns ordered sections into ordered chunks numbered `{source_id}_c01..`.
///
/// Sections with empty text contribute nothing; numbering is never reset
/// between sections.
pub fn chunk_sections(sections: &[Section], source_id: &SourceId, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut ordinal: u32 = 0;

    for section in sections {
        for text in split_section(&section.text, config) {
            ordinal += 1;
            chunks.push(Chunk {
                chunk_id: ChunkId::new(source_id, ordinal),
                source_id: source_id.clone(),
                section_title: section.title.clone(),
                text,
                ordinal,
            });
        }
    }

    chunks
}

/// Chunks a document and attaches its metadata to every chunk.
pub fn chunk_document(document: &PaperDocument, config: &ChunkingConfig) -> Vec<ChunkRecord> {
    chunk_sections(&document.sections, &document.source_id, config)
        .into_iter()
        .map(|chunk| ChunkRecord::new(chunk, document.metadata.clone()))
        .collect()
}
