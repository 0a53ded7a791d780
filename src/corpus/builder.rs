use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::chunking::chunk_document;
use crate::config::ConfigError;
use crate::corpus::manifest::{ChunkIndex, CorpusBuildConfig, CorpusManifest, ManifestSourceEntry};
use crate::corpus::store::Corpus;
use crate::document::{ChunkRecord, PaperDocument};
use crate::types::identifiers::ContentVersion;

#[derive(Debug, Error)]
pub enum CorpusBuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid build configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Output directory already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Duplicate source ID: {0}")]
    DuplicateSourceId(String),
    #[error("Duplicate chunk ID: {0}")]
    DuplicateChunkId(String),
}

/// Chunks documents and writes an immutable corpus snapshot.
///
/// A corpus is never updated in place: re-ingestion builds a new directory.
/// CorpusBuilder is single-threaded and non-reentrant.
pub struct CorpusBuilder {
    config: CorpusBuildConfig,
}

impl CorpusBuilder {
    pub fn new(config: CorpusBuildConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, documents: Vec<PaperDocument>, output_dir: &Path) -> Result<Corpus, CorpusBuildError> {
        self.config.chunking.validate()?;

        if output_dir.exists() {
            return Err(CorpusBuildError::OutputExists(output_dir.to_path_buf()));
        }

        // 1. Sort by source id; duplicates end up adjacent
        let mut sorted_docs = documents;
        sorted_docs.sort_by(|a, b| a.source_id.cmp(&b.source_id));

        for pair in sorted_docs.windows(2) {
            if pair[0].source_id == pair[1].source_id {
                return Err(CorpusBuildError::DuplicateSourceId(
                    pair[0].source_id.as_str().to_string(),
                ));
            }
        }

        // 2. Chunk and serialize each source, hashing the exact bytes written
        let mut version_hasher = Sha256::new();
        version_hasher.update(serde_json::to_vec(&self.config)?);

        let mut source_files: Vec<(ManifestSourceEntry, Vec<u8>)> = Vec::with_capacity(sorted_docs.len());
        let mut index_entries = BTreeMap::new();
        let mut chunk_count = 0;

        for doc in &sorted_docs {
            let records: Vec<ChunkRecord> = chunk_document(doc, &self.config.chunking);

            for record in &records {
                let previous = index_entries.insert(record.chunk.chunk_id.clone(), doc.source_id.clone());
                if previous.is_some() {
                    return Err(CorpusBuildError::DuplicateChunkId(
                        record.chunk.chunk_id.as_str().to_string(),
                    ));
                }
            }

            let bytes = serde_json::to_vec(&records)?;
            let version = ContentVersion::from_content(&bytes);

            let line = format!("{}:{}", doc.source_id.as_str(), version.as_str());
            version_hasher.update(line.as_bytes());

            chunk_count += records.len();
            let entry = ManifestSourceEntry {
                source_id: doc.source_id.clone(),
                version,
                file: format!("sources/{}.json", doc.source_id.as_str()),
                chunk_count: records.len(),
            };
            source_files.push((entry, bytes));
        }

        let corpus_version = format!("sha256:{}", hex::encode(version_hasher.finalize()));

        // 3. Manifest
        let manifest = CorpusManifest {
            corpus_version: corpus_version.clone(),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            source_count: source_files.len(),
            chunk_count,
            sources: source_files.iter().map(|(entry, _)| entry.clone()).collect(),
        };
        let index = ChunkIndex::new(index_entries);

        // 4. Write into a temp dir named after the version, then rename
        let suffix = corpus_version.get(7..19).unwrap_or("partial");
        let temp_dir = output_dir.with_extension(format!("tmp.{suffix}"));

        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(temp_dir.join("sources"))?;

        for (entry, bytes) in &source_files {
            let mut f = fs::File::create(temp_dir.join(&entry.file))?;
            f.write_all(bytes)?;
            f.sync_all()?;
        }

        let f_idx = fs::File::create(temp_dir.join("index.json"))?;
        serde_json::to_writer_pretty(&f_idx, &index)?;
        f_idx.sync_all()?;

        let f_man = fs::File::create(temp_dir.join("manifest.json"))?;
        serde_json::to_writer_pretty(&f_man, &manifest)?;
        f_man.sync_all()?;

        fs::rename(&temp_dir, output_dir)?;

        info!(
            sources = manifest.source_count,
            chunks = manifest.chunk_count,
            version = manifest.corpus_version.as_str(),
            "corpus built"
        );

        Ok(Corpus {
            root: output_dir.to_path_buf(),
            manifest,
        })
    }
}
