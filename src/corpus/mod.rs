pub mod builder;
pub mod manifest;
pub mod store;

pub use builder::{CorpusBuildError, CorpusBuilder};
pub use manifest::{ChunkIndex, CorpusBuildConfig, CorpusManifest, ManifestSourceEntry};
pub use store::{Corpus, CorpusLoadError};
