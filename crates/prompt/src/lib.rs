//! Prompt system for localqa.
//!
//! - YAML prompt definitions, with a built-in question-answering prompt
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    default_prompt, load_prompt, resolve_prompt, CONTEXT_VAR, DEFAULT_PROMPT_ID, QUESTION_VAR,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
