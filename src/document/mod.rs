pub mod document;
pub mod metadata;
pub mod record;

pub use crate::types::identifiers::{ChunkId, SourceId};
pub use document::{PaperDocument, Section};
pub use metadata::{Metadata, MetadataValue};
pub use record::ChunkRecord;
