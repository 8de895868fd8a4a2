//! PDF: one document per page.

use super::LoadError;
use crate::types::LogicalDocument;
use std::fs;
use std::path::Path;

/// Page separator in extracted text.
const PAGE_BREAK: char = '\u{c}';

pub(crate) fn load_pdf(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let bytes = fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(LoadError::format)?;
    Ok(split_pages(source, &text))
}

fn split_pages(source: &str, text: &str) -> Vec<LogicalDocument> {
    let pages: Vec<&str> = text.trim_end_matches(PAGE_BREAK).split(PAGE_BREAK).collect();
    let total = pages.len();

    pages
        .into_iter()
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(index, page)| {
            LogicalDocument::new(source, page.trim())
                .with_meta("page", index + 1)
                .with_meta("total_pages", total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let docs = split_pages("a.pdf", "first page\n\u{c}\n\u{c}third page\n\u{c}");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "first page");
        assert_eq!(docs[0].metadata["page"], 1);
        assert_eq!(docs[1].metadata["page"], 3);
        assert_eq!(docs[1].metadata["total_pages"], 3);
    }
}
