use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::chunking::ChunkingConfig;
use crate::types::identifiers::{ChunkId, ContentVersion, SourceId};

// Part of the corpus version: changing any field re-versions the corpus.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CorpusBuildConfig {
    pub version: String,
    pub hash_algorithm: String,
    pub chunking: ChunkingConfig,
}

impl CorpusBuildConfig {
    pub fn v0() -> Self {
        Self {
            version: "1".into(),
            hash_algorithm: "sha256".into(),
            chunking: ChunkingConfig::v0(),
        }
    }

    pub fn with_chunking(chunking: ChunkingConfig) -> Self {
        Self {
            chunking,
            ..Self::v0()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestSourceEntry {
    pub source_id: SourceId,
    /// Hash of the source file's bytes.
    pub version: ContentVersion,
    pub file: String,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CorpusManifest {
    pub corpus_version: String,
    pub build_config: CorpusBuildConfig,
    pub created_at: DateTime<Utc>, // informational only
    pub source_count: usize,
    pub chunk_count: usize,
    pub sources: Vec<ManifestSourceEntry>,
}

/// chunk_id → source_id for every chunk in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChunkIndex {
    entries: BTreeMap<ChunkId, SourceId>,
}

impl ChunkIndex {
    pub fn new(entries: BTreeMap<ChunkId, SourceId>) -> Self {
        Self { entries }
    }

    pub fn source_of(&self, chunk_id: &str) -> Option<&SourceId> {
        self.entries.get(chunk_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
