//! Prompt builder.
//!
//! Renders a [`PromptDefinition`] with Handlebars. HTML escaping is off:
//! the output goes to a language model, not a browser.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use localqa_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and variables.
///
/// # Arguments
/// * `definition` - The prompt definition
/// * `variables` - Template variables (e.g., `context`, `question`)
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let rendered = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(rendered, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::default_prompt;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars);
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "<b>a & b</b>".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "<b>a & b</b>");
    }

    #[test]
    fn test_build_default_prompt() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "cats are mammals".to_string());
        vars.insert("question".to_string(), "what is a mammal".to_string());

        let built = build_prompt(&default_prompt(), vars).unwrap();
        assert!(built.text.contains("cats are mammals\n\nQuestion: what is a mammal\nHelpful Answer:"));
        assert_eq!(built.metadata.source_prompt_id, "qa.stuff");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        let result = render_template("Question: {{missing}}", &vars);
        // Handlebars renders missing variables as empty string
        assert_eq!(result.unwrap(), "Question: ");
    }
}
