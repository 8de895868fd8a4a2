//! Embedding configuration.

use localqa_core::{AppError, AppResult, EmbeddingSettings};
use serde::{Deserialize, Serialize};

/// Embedding provider configuration.
///
/// The provider, model and dimensions define the embedding space of an
/// index. Vectors from different spaces must never be compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum texts per embedding call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: default_batch_size(),
            endpoint: None,
        }
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model_name.clone(),
            dimensions: settings.dimensions,
            batch_size: default_batch_size(),
            endpoint: settings.endpoint.clone(),
        }
    }
}

impl EmbeddingConfig {
    /// Check that `other` describes the same embedding space as `self`.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::EmbeddingSpaceMismatch(format!(
                "provider: index uses '{}', configured '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::EmbeddingSpaceMismatch(format!(
                "model: index uses '{}', configured '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::EmbeddingSpaceMismatch(format!(
                "dimensions: index uses {}, configured {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}
