//! Knowledge pipeline type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Free-form document metadata. Always carries [`SOURCE_KEY`].
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key holding the originating file path.
pub const SOURCE_KEY: &str = "source";

/// Read the source path out of a metadata map.
pub fn source_of(metadata: &Metadata) -> Option<&str> {
    metadata.get(SOURCE_KEY).and_then(Value::as_str)
}

/// One unit of extracted text: a page, a row, a note or a whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalDocument {
    /// Extracted text
    pub text: String,

    /// Metadata, `source` included
    pub metadata: Metadata,
}

impl LogicalDocument {
    /// Create a document for `source` with no extra metadata.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.to_string(), Value::String(source.into()));
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// The originating file path.
    pub fn source(&self) -> &str {
        source_of(&self.metadata).unwrap_or_default()
    }
}

/// A contiguous piece of a [`LogicalDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub text: String,

    /// Metadata inherited from the parent document
    pub metadata: Metadata,

    /// Index of the chunk within its parent document
    pub position: u32,

    /// Byte offset of the chunk in the parent text
    pub byte_offset: usize,
}

impl Chunk {
    /// The originating file path.
    pub fn source(&self) -> &str {
        source_of(&self.metadata).unwrap_or_default()
    }
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A file that could not be loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Supported files found under the source directory
    pub files_discovered: usize,

    /// Files skipped because the index already holds them
    pub files_skipped: usize,

    /// Files loaded successfully
    pub files_loaded: usize,

    /// Files that failed to load
    pub failures: Vec<LoadFailure>,

    /// Logical documents kept for chunking
    pub documents: usize,

    /// Whether the document list was cut at the per-run ceiling
    pub truncated: bool,

    /// Chunks produced
    pub chunks: usize,
}

/// Result of the collection phase.
#[derive(Debug)]
pub enum Collected {
    /// Nothing new to index
    NoWork,

    /// Chunks ready for the vector store
    Chunks {
        chunks: Vec<Chunk>,
        report: IngestReport,
    },
}

/// Result of a full ingestion run.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Every discovered file was already indexed (or none loaded)
    NoNewDocuments,

    /// New chunks were embedded and persisted
    Ingested(IngestReport),
}
