//! GPT4All backend.
//!
//! Talks to the GPT4All desktop API server, which exposes an
//! OpenAI-compatible completions endpoint on localhost.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::sse::event_stream;
use localqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Terminal payload of an OpenAI-style event stream.
const DONE_MARKER: &str = "[DONE]";

/// `/v1/completions` request format.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// `/v1/completions` response and stream event format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl CompletionResponse {
    fn text(&self) -> String {
        self.choices
            .iter()
            .map(|choice| choice.text.as_str())
            .collect()
    }

    fn finished(&self) -> bool {
        self.choices
            .iter()
            .any(|choice| choice.finish_reason.is_some())
    }
}

/// GPT4All API server client.
pub struct Gpt4AllClient {
    /// Base URL of the GPT4All API server
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl Gpt4AllClient {
    /// Create a client for a server at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The server addresses models by file name, not by path.
    fn model_name(model: &str) -> String {
        Path::new(model)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| model.to_string())
    }

    fn to_completion_request(&self, request: &LlmRequest) -> CompletionRequest {
        CompletionRequest {
            model: Self::model_name(&request.model),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            stream: request.stream,
        }
    }

    async fn post(&self, body: &CompletionRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/v1/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::Llm(format!(
                    "Failed to reach GPT4All server at {}: {}",
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
                "GPT4All server error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one streamed event.
fn parse_event(data: &str) -> Option<AppResult<LlmStreamChunk>> {
    if data == DONE_MARKER {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            done: true,
            usage: None,
        }));
    }

    let event: CompletionResponse = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(AppError::Llm(format!(
                "Failed to parse GPT4All stream event: {}",
                e
            ))))
        }
    };

    let content = event.text();
    if content.is_empty() && !event.finished() {
        return None;
    }

    Some(Ok(LlmStreamChunk {
        content,
        done: false,
        usage: event.usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for Gpt4AllClient {
    fn provider_name(&self) -> &str {
        "GPT4All"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Sending completion request to GPT4All");

        let mut body = self.to_completion_request(request);
        body.stream = false;

        let completion: CompletionResponse = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse GPT4All response: {}", e)))?;

        Ok(LlmResponse {
            content: completion.text(),
            model: completion.model.clone().unwrap_or(body.model),
            usage: completion.usage.unwrap_or_default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!("Starting streaming request to GPT4All");

        let mut body = self.to_completion_request(request);
        body.stream = true;

        let response = self.post(&body).await?;
        Ok(event_stream(response, parse_event))
    }
}
