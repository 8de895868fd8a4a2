//! localqa core library
//!
//! Foundations shared by every localqa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Environment-based configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingSettings, ModelSettings};
pub use error::{AppError, AppResult};
