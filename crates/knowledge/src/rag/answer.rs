//! Question answering over the vector store.

use crate::store::VectorStore;
use crate::types::Chunk;
use futures::StreamExt;
use localqa_core::{AppConfig, AppResult};
use localqa_llm::{LlmClient, LlmRequest};
use localqa_prompt::{build_prompt, PromptDefinition, CONTEXT_VAR, QUESTION_VAR};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Receives answer tokens as the model produces them.
pub trait TokenSink: Send {
    fn on_token(&mut self, token: &str) -> AppResult<()>;
}

/// Sink that drops every token.
#[derive(Debug, Default)]
pub struct NullSink;

impl TokenSink for NullSink {
    fn on_token(&mut self, _token: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Retrieval and generation settings.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    /// Chunks retrieved per question
    pub k: usize,

    /// Leave sources out of the answer
    pub hide_source: bool,

    /// Forward tokens to the sink as they are generated
    pub stream: bool,

    /// Model identifier sent to the backend
    pub model_path: String,

    pub max_tokens: u32,
    pub batch_size: u32,
}

impl AnswerOptions {
    /// Options from the configuration; fails when a model key is missing.
    pub fn from_config(config: &AppConfig, hide_source: bool, stream: bool) -> AppResult<Self> {
        let model = config.model_settings()?;
        Ok(Self {
            k: config.target_source_chunks,
            hide_source,
            stream,
            model_path: model.model_path,
            max_tokens: model.n_ctx,
            batch_size: model.n_batch,
        })
    }
}

/// An answer with the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,

    /// Retrieved chunks, best match first; empty when sources are hidden
    pub sources: Vec<Chunk>,

    /// Retrieval plus generation time
    pub elapsed: Duration,
}

/// Answers questions one at a time against a single store and backend.
pub struct Answerer {
    store: Box<dyn VectorStore>,
    llm: Box<dyn LlmClient>,
    prompt: PromptDefinition,
    options: AnswerOptions,
}

impl Answerer {
    pub fn new(
        store: Box<dyn VectorStore>,
        llm: Box<dyn LlmClient>,
        prompt: PromptDefinition,
        options: AnswerOptions,
    ) -> Self {
        Self {
            store,
            llm,
            prompt,
            options,
        }
    }

    /// Answer `question`, sending streamed tokens to `sink`.
    pub async fn answer(&self, question: &str, sink: &mut dyn TokenSink) -> AppResult<Answer> {
        let start = Instant::now();

        let retrieved = self
            .store
            .similarity_search(question, self.options.k)
            .await?;

        tracing::debug!(
            "Retrieved {} chunks - scores: {:?}",
            retrieved.len(),
            retrieved.iter().map(|r| r.score).collect::<Vec<_>>()
        );

        let sources: Vec<Chunk> = retrieved.into_iter().map(|r| r.chunk).collect();
        let context = sources
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut variables = HashMap::new();
        variables.insert(CONTEXT_VAR.to_string(), context);
        variables.insert(QUESTION_VAR.to_string(), question.to_string());
        let prompt = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(prompt.text, self.options.model_path.clone())
            .with_max_tokens(self.options.max_tokens)
            .with_batch_size(self.options.batch_size);

        tracing::info!(
            "Generating answer with {} ({} context chunks)",
            self.llm.provider_name(),
            sources.len()
        );

        let text = if self.options.stream {
            request = request.with_streaming();
            self.generate_streaming(&request, sink).await?
        } else {
            self.llm.complete(&request).await?.content
        };

        let elapsed = start.elapsed();
        tracing::debug!("Answer generated in {:.2}s", elapsed.as_secs_f64());

        Ok(Answer {
            text,
            sources: if self.options.hide_source {
                Vec::new()
            } else {
                sources
            },
            elapsed,
        })
    }

    async fn generate_streaming(
        &self,
        request: &LlmRequest,
        sink: &mut dyn TokenSink,
    ) -> AppResult<String> {
        let mut stream = self.llm.stream(request).await?;
        let mut text = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.content.is_empty() {
                sink.on_token(&chunk.content)?;
                text.push_str(&chunk.content);
            }
            if chunk.done {
                break;
            }
        }

        if text.is_empty() {
            tracing::warn!("Model backend streamed an empty answer");
        }

        Ok(text)
    }
}
