pub mod chunk;
pub mod identifiers;

pub use chunk::{Chunk, RetrievedChunk};
pub use identifiers::{ChunkId, ContentVersion, SourceId, SourceIdError};
