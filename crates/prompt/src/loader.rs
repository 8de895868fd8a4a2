//! Prompt loader.
//!
//! The question-answering prompt is built in. A YAML file with the same
//! shape can replace it.

use crate::types::PromptDefinition;
use localqa_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in "stuff" question-answering prompt.
pub const DEFAULT_PROMPT_ID: &str = "qa.stuff";

/// Variable holding the retrieved chunk texts.
pub const CONTEXT_VAR: &str = "context";

/// Variable holding the user's question.
pub const QUESTION_VAR: &str = "question";

const DEFAULT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{{context}}\n\n\
Question: {{question}}\n\
Helpful Answer:";

/// The built-in question-answering prompt.
pub fn default_prompt() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_PROMPT_ID.to_string(),
        title: "Answer from retrieved context".to_string(),
        api_version: "1.0".to_string(),
        created_by: "localqa".to_string(),
        template: DEFAULT_TEMPLATE.to_string(),
    }
}

/// Use the prompt at `path` when given, the built-in one otherwise.
pub fn resolve_prompt(path: Option<&Path>) -> AppResult<PromptDefinition> {
    match path {
        Some(path) => load_prompt(path),
        None => Ok(default_prompt()),
    }
}

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use localqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("prompts/qa.yml"))?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompt_file: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::debug!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.api_version.is_empty() || !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: '{}'. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // A prompt that never sees the question cannot answer it.
    if !def.template.contains(&format!("{{{{{}}}}}", QUESTION_VAR)) {
        return Err(AppError::Prompt(format!(
            "Prompt template '{}' must reference {{{{{}}}}}",
            def.id, QUESTION_VAR
        )));
    }

    if !def.template.contains(&format!("{{{{{}}}}}", CONTEXT_VAR)) {
        tracing::warn!(
            "Prompt template '{}' does not reference {{{{{}}}}}; retrieved sources will not reach the model",
            def.id,
            CONTEXT_VAR
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_default_prompt_is_valid() {
        let prompt = default_prompt();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
        assert!(validate_prompt(&prompt).is_ok());
        assert!(prompt.template.contains("{{context}}"));
        assert!(prompt.template.ends_with("Helpful Answer:"));
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(
            temp_dir.path(),
            "qa.yml",
            r#"
id: qa.short
title: "Short answers"
apiVersion: "1.0"
template: "Context: {{context}}\nAnswer briefly: {{question}}"
"#,
        );

        let prompt = load_prompt(&path).unwrap();
        assert_eq!(prompt.id, "qa.short");
        assert_eq!(prompt.title, "Short answers");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(&temp_dir.path().join("missing.yml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(temp_dir.path(), "bad.yml", "invalid: yaml: content:");
        assert!(load_prompt(&path).is_err());
    }

    #[test]
    fn test_template_without_question_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_prompt(
            temp_dir.path(),
            "noq.yml",
            "id: noq\ntitle: t\napiVersion: \"1.0\"\ntemplate: \"{{context}}\"\n",
        );

        let err = load_prompt(&path).unwrap_err();
        assert!(err.to_string().contains("{{question}}"));
    }

    #[test]
    fn test_resolve_prompt_falls_back_to_default() {
        let prompt = resolve_prompt(None).unwrap();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
    }
}
