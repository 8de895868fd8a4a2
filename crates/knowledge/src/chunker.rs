//! Text chunking with configurable size and overlap.
//!
//! Splitting is recursive and semantic: paragraph breaks first, then
//! lines, sentences, words, graphemes and characters. Sizes are counted in
//! characters. Whitespace is kept so chunks cover the whole input.

use crate::types::{Chunk, LogicalDocument};
use localqa_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Chunk size and overlap, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: localqa_core::config::DEFAULT_CHUNK_SIZE,
            chunk_overlap: localqa_core::config::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits documents into chunks.
pub struct Chunker {
    config: ChunkerConfig,
    splitter: TextSplitter<Characters>,
}

impl Chunker {
    /// Create a chunker. Fails when the overlap is not smaller than the size.
    pub fn new(config: ChunkerConfig) -> AppResult<Self> {
        if config.chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than 0".to_string(),
            ));
        }

        let chunk_config = ChunkConfig::new(config.chunk_size)
            .with_overlap(config.chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk overlap: {}", e)))?
            .with_trim(false);

        Ok(Self {
            config,
            splitter: TextSplitter::new(chunk_config),
        })
    }

    /// Split one document. Positions count from 0.
    pub fn split_document(&self, document: &LogicalDocument) -> Vec<Chunk> {
        self.splitter
            .chunk_indices(&document.text)
            .filter(|(_, text)| !text.trim().is_empty())
            .enumerate()
            .map(|(position, (byte_offset, text))| Chunk {
                text: text.to_string(),
                metadata: document.metadata.clone(),
                position: position as u32,
                byte_offset,
            })
            .collect()
    }

    /// Split documents in order.
    pub fn split(&self, documents: &[LogicalDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|document| self.split_document(document))
            .collect();

        tracing::debug!(
            "Chunked {} documents into {} chunks (size: {}, overlap: {})",
            documents.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        chunks
    }
}
