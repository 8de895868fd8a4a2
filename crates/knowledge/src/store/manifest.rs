//! Index manifest (`config.yaml`).

use crate::chunker::ChunkerConfig;
use crate::embeddings::EmbeddingConfig;
use chrono::{DateTime, Utc};
use localqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Manifest layout version.
pub const FORMAT_VERSION: u32 = 1;

/// What an index was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(space: &EmbeddingConfig, chunking: ChunkerConfig) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            embedding_provider: space.provider.clone(),
            embedding_model: space.model.clone(),
            embedding_dimensions: space.dimensions,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            created_at: Utc::now(),
        }
    }

    /// Embedding space the stored vectors belong to.
    pub fn embedding_space(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: self.embedding_provider.clone(),
            model: self.embedding_model.clone(),
            dimensions: self.embedding_dimensions,
            ..EmbeddingConfig::default()
        }
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read index manifest {:?}: {}", path, e))
        })?;

        let manifest: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Knowledge(format!("Failed to parse index manifest {:?}: {}", path, e))
        })?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(AppError::Knowledge(format!(
                "Unsupported index format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|e| {
            AppError::Knowledge(format!("Failed to write index manifest {:?}: {}", path, e))
        })?;
        Ok(())
    }
}
