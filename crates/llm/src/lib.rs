//! Language model integration for localqa.
//!
//! Backends are reached over HTTP through the [`LlmClient`] trait. The set
//! of backends is closed: see [`ModelType`].
//!
//! # Backends
//! - **LlamaCpp**: llama.cpp server (`/completion`)
//! - **GPT4All**: GPT4All API server (`/v1/completions`)
//!
//! # Example
//! ```no_run
//! use localqa_llm::{create_client, LlmRequest, ModelType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model_type = ModelType::parse("LlamaCpp")?;
//! let client = create_client(model_type, None);
//! let request = LlmRequest::new("Hello, world!", "models/ggml-model-q4_0.bin");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod sse;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use factory::create_client;
pub use types::ModelType;
