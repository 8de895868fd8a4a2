//! Model backend factory.
//!
//! Resolves the configured backend from the closed [`ModelType`] set and
//! builds its client. Construction does no network I/O; the first request
//! is the first contact with the backend.

use crate::client::LlmClient;
use crate::providers::{Gpt4AllClient, LlamaCppClient};
use crate::types::ModelType;

/// Create the client for a backend.
///
/// # Arguments
/// * `model_type` - Backend to talk to
/// * `endpoint` - Optional endpoint override; each backend has a localhost default
///
/// # Returns
/// A boxed client owned exclusively by the caller
pub fn create_client(model_type: ModelType, endpoint: Option<&str>) -> Box<dyn LlmClient> {
    let base_url = endpoint.unwrap_or(model_type.default_endpoint());
    tracing::debug!("Using {} backend at {}", model_type, base_url);

    match model_type {
        ModelType::LlamaCpp => Box::new(LlamaCppClient::with_base_url(base_url)),
        ModelType::Gpt4All => Box::new(Gpt4AllClient::with_base_url(base_url)),
    }
}
