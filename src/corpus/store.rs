// Read-only view of a built corpus.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::corpus::manifest::CorpusManifest;
use crate::document::ChunkRecord;
use crate::types::identifiers::{ChunkId, ContentVersion};

#[derive(Debug, Error)]
pub enum CorpusLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Source version mismatch for {source_id}: manifest says {expected}, content hashes to {actual}")]
    VersionMismatch {
        source_id: String,
        expected: String,
        actual: String,
    },
    #[error("Chunk {chunk_id} stored under {expected} belongs to {found}")]
    SourceMismatch {
        chunk_id: String,
        expected: String,
        found: String,
    },
    #[error("Source {source_id}: manifest lists {expected} chunks, file holds {actual}")]
    ChunkCountMismatch {
        source_id: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug)]
pub struct Corpus {
    pub root: PathBuf,
    pub manifest: CorpusManifest,
}

impl Corpus {
    pub fn open(root: &Path) -> Result<Self, CorpusLoadError> {
        let f = fs::File::open(root.join("manifest.json"))?;
        let manifest: CorpusManifest = serde_json::from_reader(f)?;
        Ok(Corpus {
            root: root.to_path_buf(),
            manifest,
        })
    }

    /// Every chunk record in manifest order, verified against the manifest.
    pub fn load_records(&self) -> Result<Vec<ChunkRecord>, CorpusLoadError> {
        let mut loaded = Vec::with_capacity(self.manifest.chunk_count);
        for entry in &self.manifest.sources {
            let bytes = fs::read(self.root.join(&entry.file))?;

            let actual = ContentVersion::from_content(&bytes);
            if actual != entry.version {
                return Err(CorpusLoadError::VersionMismatch {
                    source_id: entry.source_id.as_str().to_string(),
                    expected: entry.version.as_str().to_string(),
                    actual: actual.as_str().to_string(),
                });
            }

            let records: Vec<ChunkRecord> = serde_json::from_slice(&bytes)?;
            if records.len() != entry.chunk_count {
                return Err(CorpusLoadError::ChunkCountMismatch {
                    source_id: entry.source_id.as_str().to_string(),
                    expected: entry.chunk_count,
                    actual: records.len(),
                });
            }
            if let Some(stray) = records.iter().find(|r| r.chunk.source_id != entry.source_id) {
                return Err(CorpusLoadError::SourceMismatch {
                    chunk_id: stray.chunk.chunk_id.as_str().to_string(),
                    expected: entry.source_id.as_str().to_string(),
                    found: stray.chunk.source_id.as_str().to_string(),
                });
            }

            loaded.extend(records);
        }
        Ok(loaded)
    }

    /// All chunk ids in the corpus: the set citations are validated against.
    pub fn chunk_universe(&self) -> Result<BTreeSet<ChunkId>, CorpusLoadError> {
        Ok(self
            .load_records()?
            .into_iter()
            .map(|record| record.chunk.chunk_id)
            .collect())
    }
}
