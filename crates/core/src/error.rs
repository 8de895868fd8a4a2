//! Error types for localqa.
//!
//! One error enum covers configuration, I/O, model backends, the knowledge
//! pipeline and prompt rendering. Per-file loader errors and the startup
//! model check have their own variants so callers can match on them.

use thiserror::Error;

/// Unified error type for localqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Index, embedding and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No loader is registered for the file extension.
    #[error("Unsupported file extension '{extension}'")]
    UnsupportedFormat { extension: String },

    /// A loader failed while extracting a file. The path is kept next to
    /// the underlying message.
    #[error("{path}: {message}")]
    LoaderFailure { path: String, message: String },

    /// `MODEL_TYPE` names a backend outside the supported set.
    #[error("Model type {value} is not supported. Please choose one of the following: {supported}")]
    UnsupportedModelType { value: String, supported: String },

    /// The index was built with a different embedding model or dimension.
    #[error("Embedding space mismatch: {0}")]
    EmbeddingSpaceMismatch(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// True for errors that only affect a single source file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            AppError::UnsupportedFormat { .. } | AppError::LoaderFailure { .. }
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_type_names_alternatives() {
        let err = AppError::UnsupportedModelType {
            value: "Unsupported".to_string(),
            supported: "LlamaCpp, GPT4All".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Model type Unsupported is not supported. Please choose one of the following: LlamaCpp, GPT4All"
        );
    }

    #[test]
    fn test_loader_failure_keeps_path() {
        let err = AppError::LoaderFailure {
            path: "source_documents/mail.eml".to_string(),
            message: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "source_documents/mail.eml: bad header");
        assert!(err.is_per_file());
    }

    #[test]
    fn test_per_file_classification() {
        let unsupported = AppError::UnsupportedFormat {
            extension: "unknownext".to_string(),
        };
        assert!(unsupported.is_per_file());
        assert!(unsupported.to_string().contains("unknownext"));
        assert!(!AppError::Config("x".to_string()).is_per_file());
    }
}
