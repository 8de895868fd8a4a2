//! HTML to text.
//!
//! Also used for the XHTML inside e-books, Evernote notes and HTML mail.

use super::LoadError;
use crate::types::LogicalDocument;
use scraper::{ElementRef, Html, Node};
use std::fs;
use std::path::Path;

/// Elements whose content is never visible.
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that end a line of text.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

pub(crate) fn load_html(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let bytes = fs::read(path)?;
    let html = String::from_utf8_lossy(&bytes);
    Ok(vec![LogicalDocument::new(source, html_to_text(&html))])
}

/// Extract the visible text of an HTML document.
///
/// Block elements become line breaks; whitespace inside a line is
/// collapsed and empty lines are dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    normalize_lines(&raw)
}

/// One pending step of the document walk.
enum Step<N> {
    Visit(N),
    EndBlock,
}

/// Depth-first walk with an explicit stack; nesting depth is bounded
/// only by the heap.
fn collect_text(root: ElementRef<'_>, out: &mut String) {
    let mut stack = vec![Step::Visit(*root)];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::EndBlock => {
                out.push('\n');
                continue;
            }
        };

        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if HIDDEN.contains(&name) {
                    continue;
                }
                if BLOCKS.contains(&name) {
                    stack.push(Step::EndBlock);
                }
                stack.extend(node.children().rev().map(Step::Visit));
            }
            _ => {}
        }
    }
}

fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
