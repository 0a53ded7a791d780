use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::types::identifiers::SourceId;

/// One titled section as produced by structural extraction, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub text: String,
}

impl Section {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A parsed paper ready for chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperDocument {
    pub source_id: SourceId,
    pub metadata: Metadata,
    pub sections: Vec<Section>,
}

impl PaperDocument {
    pub fn new(source_id: SourceId, metadata: Metadata, sections: Vec<Section>) -> Self {
        Self {
            source_id,
            metadata,
            sections,
        }
    }
}
