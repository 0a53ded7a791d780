use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunking::ChunkingConfig;
use crate::evaluation::EvaluationConfig;
use crate::retrieval::RetrievalConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Serializable, comparable, explicit defaults.
// Missing sections fall back to their v0() values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl PipelineConfig {
    pub fn v0() -> Self {
        Self {
            chunking: ChunkingConfig::v0(),
            retrieval: RetrievalConfig::v0(),
            evaluation: EvaluationConfig::v0(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::v0()
    }
}
