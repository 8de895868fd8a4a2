//! Model backend implementations.

pub mod gpt4all;
pub mod llama_cpp;

pub use gpt4all::Gpt4AllClient;
pub use llama_cpp::LlamaCppClient;
