//! LLM client abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to a locally
//! hosted language model backend.

use futures::Stream;
use localqa_core::AppResult;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One generation request.
///
/// `model` is the configured model path; backends that address models by
/// name derive it from the path.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub model: String,

    /// Upper bound on generated tokens (`MODEL_N_CTX`)
    pub max_tokens: Option<u32>,

    /// Prompt evaluation batch size (`MODEL_N_BATCH`)
    pub batch_size: Option<u32>,

    pub stream: bool,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            batch_size: None,
            stream: false,
        }
    }

    pub fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// A complete, non-streamed answer.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One streamed piece of an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmStreamChunk {
    /// Text generated since the previous chunk
    pub content: String,

    /// Set on the last chunk of a stream
    pub done: bool,

    /// Usage totals, when the backend reports them at the end
    pub usage: Option<LlmUsage>,
}

/// Answer chunks in generation order.
pub type LlmStream = Pin<Box<dyn Stream<Item = AppResult<LlmStreamChunk>> + Send>>;

/// Trait for language model backends.
///
/// Backends are external services; implementations translate between
/// [`LlmRequest`] and the backend's wire format.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the backend name (e.g., "LlamaCpp").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;

    /// Perform a streaming completion.
    ///
    /// Chunks are yielded in generation order.
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream>;
}
