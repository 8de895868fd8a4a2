//! Plain text and Markdown.

use super::LoadError;
use crate::types::LogicalDocument;
use pulldown_cmark::{Event, Parser, TagEnd};
use std::fs;
use std::path::Path;

/// Read a file that must be valid UTF-8.
pub(crate) fn read_utf8(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| LoadError::Encoding(e.utf8_error().to_string()))
}

pub(crate) fn load_text(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let text = read_utf8(path)?;
    Ok(vec![LogicalDocument::new(source, text)])
}

pub(crate) fn load_markdown(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let markdown = read_utf8(path)?;
    Ok(vec![LogicalDocument::new(source, markdown_to_text(&markdown))])
}

/// Render Markdown to plain text, dropping the markup.
fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                out.push_str("\n\n")
            }
            Event::End(TagEnd::Item) => out.push('\n'),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_markdown_syntax_removed() {
        let text = markdown_to_text("# Cats\n\nCats are **mammals**.\n\n- purr\n- nap\n\n`code`");
        assert_eq!(text, "Cats\n\nCats are mammals.\n\npurr\nnap\ncode");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.txt");
        fs::write(&path, [0x66, 0x6f, 0xff, 0x6f]).unwrap();

        let err = load_text(&path, "bad.txt").unwrap_err();
        assert!(matches!(err, LoadError::Encoding(_)));
    }

    #[test]
    fn test_plain_text_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "line one\nline two\n").unwrap();

        let docs = load_text(&path, "a.txt").unwrap();
        assert_eq!(docs[0].text, "line one\nline two\n");
    }
}
