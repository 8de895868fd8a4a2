//! Embedding providers.
//!
//! Texts become fixed-size vectors; the provider configuration fixes the
//! embedding space of an index.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
