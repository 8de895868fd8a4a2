//! llama.cpp backend.
//!
//! Talks to the HTTP server shipped with llama.cpp, which hosts a quantized
//! model on the CPU. API: `POST /completion`, with server-sent events when
//! `stream` is set.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::sse::event_stream;
use localqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// llama.cpp `/completion` request format.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_batch: Option<u32>,
    stream: bool,
}

/// llama.cpp `/completion` response and stream event format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    stop: bool,
    #[serde(default)]
    tokens_evaluated: Option<u32>,
    #[serde(default)]
    tokens_predicted: Option<u32>,
}

impl CompletionResponse {
    fn usage(&self) -> LlmUsage {
        LlmUsage::new(
            self.tokens_evaluated.unwrap_or(0),
            self.tokens_predicted.unwrap_or(0),
        )
    }
}

/// llama.cpp server client.
pub struct LlamaCppClient {
    /// Base URL of the llama.cpp server
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl LlamaCppClient {
    /// Create a client for a server at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn to_completion_request(&self, request: &LlmRequest) -> CompletionRequest {
        CompletionRequest {
            prompt: request.prompt.clone(),
            n_predict: request.max_tokens,
            n_batch: request.batch_size,
            stream: request.stream,
        }
    }

    async fn post(&self, body: &CompletionRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/completion", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::Llm(format!(
                    "Failed to reach llama.cpp server at {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "llama.cpp server error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one streamed event.
fn parse_event(data: &str) -> Option<AppResult<LlmStreamChunk>> {
    let event: CompletionResponse = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(AppError::Llm(format!(
                "Failed to parse llama.cpp stream event: {}",
                e
            ))))
        }
    };

    Some(Ok(LlmStreamChunk {
        usage: event.stop.then(|| event.usage()),
        content: event.content,
        done: event.stop,
    }))
}

#[async_trait::async_trait]
impl LlmClient for LlamaCppClient {
    fn provider_name(&self) -> &str {
        "LlamaCpp"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending completion request to llama.cpp");

        let mut body = self.to_completion_request(request);
        body.stream = false;

        let completion: CompletionResponse = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse llama.cpp response: {}", e)))?;

        Ok(LlmResponse {
            usage: completion.usage(),
            content: completion.content,
            model: request.model.clone(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!("Starting streaming request to llama.cpp");

        let mut body = self.to_completion_request(request);
        body.stream = true;

        let response = self.post(&body).await?;
        Ok(event_stream(response, parse_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_conversion() {
        let client = LlamaCppClient::with_base_url("http://localhost:8080/");
        let request = LlmRequest::new("Hello", "models/ggml-model-q4_0.bin")
            .with_max_tokens(1000)
            .with_batch_size(8);

        let body = client.to_completion_request(&request);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(body.prompt, "Hello");
        assert_eq!(body.n_predict, Some(1000));
        assert_eq!(body.n_batch, Some(8));
        assert!(!body.stream);
    }

    #[test]
    fn test_parse_stream_events() {
        let chunk = parse_event(r#"{"content":" Paris","stop":false}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.content, " Paris");
        assert!(!chunk.done);
        assert!(chunk.usage.is_none());

        let last = parse_event(
            r#"{"content":"","stop":true,"tokens_evaluated":20,"tokens_predicted":5}"#,
        )
        .unwrap()
        .unwrap();
        assert!(last.done);
        assert_eq!(last.usage, Some(LlmUsage::new(20, 5)));
    }

    #[test]
    fn test_parse_invalid_event() {
        assert!(parse_event("not json").unwrap().is_err());
    }
}
