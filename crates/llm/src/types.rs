//! Model backend types.

use localqa_core::{AppError, AppResult};

/// Closed set of supported model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// llama.cpp server hosting a quantized GGML/GGUF model
    LlamaCpp,
    /// GPT4All local API server
    Gpt4All,
}

impl ModelType {
    /// Every supported backend, in the order they are listed to users.
    pub const ALL: [ModelType; 2] = [ModelType::LlamaCpp, ModelType::Gpt4All];

    /// Parse the configured `MODEL_TYPE` value.
    ///
    /// Matching is exact; anything else is `UnsupportedModelType`.
    pub fn parse(s: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|model_type| model_type.as_str() == s)
            .ok_or_else(|| AppError::UnsupportedModelType {
                value: s.to_string(),
                supported: Self::supported(),
            })
    }

    /// Get the canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LlamaCpp => "LlamaCpp",
            Self::Gpt4All => "GPT4All",
        }
    }

    /// Endpoint used when `MODEL_ENDPOINT` is not set.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::LlamaCpp => "http://localhost:8080",
            Self::Gpt4All => "http://localhost:4891",
        }
    }

    /// Comma separated list of supported backends.
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(|model_type| model_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_parsing() {
        assert_eq!(ModelType::parse("LlamaCpp").unwrap(), ModelType::LlamaCpp);
        assert_eq!(ModelType::parse("GPT4All").unwrap(), ModelType::Gpt4All);
    }

    #[test]
    fn test_unsupported_model_type() {
        match ModelType::parse("Unsupported") {
            Err(AppError::UnsupportedModelType { value, supported }) => {
                assert_eq!(value, "Unsupported");
                assert_eq!(supported, "LlamaCpp, GPT4All");
            }
            other => panic!("Expected UnsupportedModelType, got {:?}", other),
        }
    }

    #[test]
    fn test_parsing_is_case_sensitive() {
        assert!(ModelType::parse("llamacpp").is_err());
        assert!(ModelType::parse("").is_err());
    }
}
