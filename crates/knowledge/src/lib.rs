//! Local document question answering.
//!
//! Loads documents from a source directory, splits them into chunks,
//! embeds them into a persistent SQLite vector index and answers
//! questions against that index with a local model backend.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod progress;
pub mod rag;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use chunker::{Chunker, ChunkerConfig};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use ingest::{collect, ingest, IngestOptions};
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::{Answer, AnswerOptions, Answerer, NullSink, TokenSink};
pub use store::{index_exists, SqliteVectorStore, VectorStore};
pub use types::{
    Chunk, Collected, IngestOutcome, IngestReport, LoadFailure, LogicalDocument, Metadata,
    ScoredChunk,
};

#[cfg(test)]
mod tests;
