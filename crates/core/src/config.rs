//! Configuration management for localqa.
//!
//! Settings come from environment-style key/value pairs. An optional `.env`
//! file in the working directory is loaded first; variables already present
//! in the process environment win over the file.
//!
//! The configuration is read once at startup into [`AppConfig`] and handed
//! to every component by reference.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default root scanned for documents.
pub const DEFAULT_SOURCE_DIRECTORY: &str = "source_documents";

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between neighbouring chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Ceiling on logical document parts processed in one ingestion run.
pub const DEFAULT_MAX_PARTS_PER_RUN: usize = 5100;

/// Default retrieval depth.
pub const DEFAULT_TARGET_SOURCE_CHUNKS: usize = 4;

/// Default inference batch size for the model backend.
pub const DEFAULT_MODEL_N_BATCH: u32 = 8;

/// Default embedding provider.
pub const DEFAULT_EMBEDDINGS_PROVIDER: &str = "ollama";

/// Default embedding dimensionality (all-MiniLM-L6-v2 class models).
pub const DEFAULT_EMBEDDINGS_DIMENSIONS: usize = 384;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the vector index artifacts
    pub persist_directory: PathBuf,

    /// Root scanned recursively for documents
    pub source_directory: PathBuf,

    /// Embedding provider settings
    pub embeddings: EmbeddingSettings,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between neighbouring chunks in characters
    pub chunk_overlap: usize,

    /// Maximum logical document parts per ingestion run
    pub max_parts_per_run: usize,

    /// Number of chunks retrieved per question
    pub target_source_chunks: usize,

    /// Optional YAML prompt definition overriding the built-in QA prompt
    pub prompt_template: Option<PathBuf>,

    /// Optional log file override
    pub log_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Raw model settings, validated lazily by [`AppConfig::model_settings`]
    pub model: RawModelSettings,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("ollama", "trigram")
    pub provider: String,

    /// Model identifier passed to the provider
    pub model_name: String,

    /// Expected vector dimensionality
    pub dimensions: usize,

    /// Optional provider endpoint
    pub endpoint: Option<String>,
}

/// Model settings exactly as found in the environment.
///
/// Only the query tool needs them, so they are not validated while loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawModelSettings {
    pub model_type: Option<String>,
    pub model_path: Option<String>,
    pub model_n_ctx: Option<String>,
    pub model_n_batch: Option<String>,
    pub endpoint: Option<String>,
}

/// Validated model backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Backend identifier as configured (checked against the closed set by the LLM crate)
    pub model_type: String,

    /// Path to the model weights
    pub model_path: String,

    /// Context window passed to the backend as the generation limit
    pub n_ctx: u32,

    /// Inference batch size
    pub n_batch: u32,

    /// Optional backend endpoint override
    pub endpoint: Option<String>,
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment.
    ///
    /// Environment variables:
    /// - `PERSIST_DIRECTORY` (required)
    /// - `SOURCE_DIRECTORY` (default `source_documents`)
    /// - `EMBEDDINGS_MODEL_NAME` (required)
    /// - `EMBEDDINGS_PROVIDER`, `EMBEDDINGS_DIMENSIONS`, `EMBEDDINGS_ENDPOINT`
    /// - `MODEL_TYPE`, `MODEL_PATH`, `MODEL_N_CTX`, `MODEL_N_BATCH`, `MODEL_ENDPOINT`
    /// - `TARGET_SOURCE_CHUNKS` (default 4)
    /// - `CHUNK_SIZE`, `CHUNK_OVERLAP`, `MAX_PARTS_PER_RUN`
    /// - `PROMPT_TEMPLATE`, `LOG_FILE`, `RUST_LOG`
    ///
    /// # Example
    /// ```no_run
    /// use localqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.persist_directory);
    /// ```
    pub fn load() -> AppResult<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(AppError::Config(format!("Failed to read .env file: {}", e)));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            persist_directory: PathBuf::from(required(&get, "PERSIST_DIRECTORY")?),
            source_directory: get("SOURCE_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIRECTORY)),
            embeddings: EmbeddingSettings {
                provider: get("EMBEDDINGS_PROVIDER")
                    .unwrap_or_else(|| DEFAULT_EMBEDDINGS_PROVIDER.to_string()),
                model_name: required(&get, "EMBEDDINGS_MODEL_NAME")?,
                dimensions: parse_or(&get, "EMBEDDINGS_DIMENSIONS", DEFAULT_EMBEDDINGS_DIMENSIONS)?,
                endpoint: get("EMBEDDINGS_ENDPOINT"),
            },
            chunk_size: parse_or(&get, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse_or(&get, "CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            max_parts_per_run: parse_or(&get, "MAX_PARTS_PER_RUN", DEFAULT_MAX_PARTS_PER_RUN)?,
            target_source_chunks: parse_or(
                &get,
                "TARGET_SOURCE_CHUNKS",
                DEFAULT_TARGET_SOURCE_CHUNKS,
            )?,
            prompt_template: get("PROMPT_TEMPLATE").map(PathBuf::from),
            log_file: get("LOG_FILE").map(PathBuf::from),
            log_level: get("RUST_LOG"),
            model: RawModelSettings {
                model_type: get("MODEL_TYPE"),
                model_path: get("MODEL_PATH"),
                model_n_ctx: get("MODEL_N_CTX"),
                model_n_batch: get("MODEL_N_BATCH"),
                endpoint: get("MODEL_ENDPOINT"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate values that every tool depends on.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("CHUNK_SIZE must be greater than 0".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.target_source_chunks == 0 {
            return Err(AppError::Config(
                "TARGET_SOURCE_CHUNKS must be greater than 0".to_string(),
            ));
        }

        if self.embeddings.dimensions == 0 {
            return Err(AppError::Config(
                "EMBEDDINGS_DIMENSIONS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured `MODEL_TYPE`, without touching any other model key.
    pub fn model_type(&self) -> AppResult<&str> {
        self.model
            .model_type
            .as_deref()
            .ok_or_else(|| missing("MODEL_TYPE"))
    }

    /// Validate and return the model backend settings.
    pub fn model_settings(&self) -> AppResult<ModelSettings> {
        let model_type = self.model_type()?.to_string();

        let model_path = self
            .model
            .model_path
            .clone()
            .ok_or_else(|| missing("MODEL_PATH"))?;

        let n_ctx = match self.model.model_n_ctx.as_deref() {
            Some(raw) => parse_value("MODEL_N_CTX", raw)?,
            None => return Err(missing("MODEL_N_CTX")),
        };

        let n_batch = match self.model.model_n_batch.as_deref() {
            Some(raw) => parse_value("MODEL_N_BATCH", raw)?,
            None => DEFAULT_MODEL_N_BATCH,
        };

        Ok(ModelSettings {
            model_type,
            model_path,
            n_ctx,
            n_batch,
            endpoint: self.model.endpoint.clone(),
        })
    }
}

fn missing(key: &str) -> AppError {
    AppError::Config(format!("Missing required environment variable: {}", key))
}

fn required<G>(get: &G, key: &str) -> AppResult<String>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| missing(key))
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> AppResult<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("PERSIST_DIRECTORY", "db"),
            ("EMBEDDINGS_MODEL_NAME", "all-minilm"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&minimal())).unwrap();
        assert_eq!(config.persist_directory, PathBuf::from("db"));
        assert_eq!(config.source_directory, PathBuf::from("source_documents"));
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.max_parts_per_run, 5100);
        assert_eq!(config.target_source_chunks, 4);
        assert_eq!(config.embeddings.provider, "ollama");
        assert_eq!(config.embeddings.dimensions, 384);
    }

    #[test]
    fn test_missing_persist_directory() {
        let err = AppConfig::from_lookup(lookup(&[("EMBEDDINGS_MODEL_NAME", "m")])).unwrap_err();
        assert!(err.to_string().contains("PERSIST_DIRECTORY"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("PERSIST_DIRECTORY", "  "),
            ("EMBEDDINGS_MODEL_NAME", "m"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PERSIST_DIRECTORY"));
    }

    #[test]
    fn test_invalid_number_names_key() {
        let mut pairs = minimal();
        pairs.push(("TARGET_SOURCE_CHUNKS", "four"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TARGET_SOURCE_CHUNKS"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut pairs = minimal();
        pairs.push(("CHUNK_SIZE", "100"));
        pairs.push(("CHUNK_OVERLAP", "100"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn test_model_settings_are_lazy() {
        let mut pairs = minimal();
        pairs.push(("MODEL_N_CTX", "not-a-number"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.model_type().is_err());
        assert!(config.model_settings().is_err());
    }

    #[test]
    fn test_model_settings_defaults() {
        let mut pairs = minimal();
        pairs.push(("MODEL_TYPE", "GPT4All"));
        pairs.push(("MODEL_PATH", "models/ggml-gpt4all-j-v1.3-groovy.bin"));
        pairs.push(("MODEL_N_CTX", "1000"));
        let settings = AppConfig::from_lookup(lookup(&pairs))
            .unwrap()
            .model_settings()
            .unwrap();

        assert_eq!(settings.model_type, "GPT4All");
        assert_eq!(settings.n_ctx, 1000);
        assert_eq!(settings.n_batch, 8);
        assert_eq!(settings.endpoint, None);
    }

    #[test]
    fn test_model_type_read_without_other_model_keys() {
        let mut pairs = minimal();
        pairs.push(("MODEL_TYPE", "Unsupported"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.model_type().unwrap(), "Unsupported");
    }
}
