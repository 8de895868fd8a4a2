//! Document loading.
//!
//! Each supported file extension maps to a [`DocumentKind`], and each kind
//! to one extraction routine. A file yields zero or more
//! [`LogicalDocument`]s, every one tagged with its source path.

mod archive;
mod delimited;
mod email;
mod epub;
mod evernote;
mod markup;
mod office;
mod pdf;
mod spreadsheet;
mod text;

use crate::types::LogicalDocument;
use localqa_core::{AppError, AppResult};
use std::path::Path;
use thiserror::Error;

pub use markup::html_to_text;

/// Document family, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    DelimitedText,
    WordProcessor,
    Spreadsheet,
    NoteExport,
    Email,
    EBook,
    Markup,
    Markdown,
    OfficeDocument,
    Presentation,
    PortableDocument,
    PlainText,
}

/// Lower-case extension to kind.
const EXTENSIONS: &[(&str, DocumentKind)] = &[
    ("csv", DocumentKind::DelimitedText),
    ("doc", DocumentKind::WordProcessor),
    ("docx", DocumentKind::WordProcessor),
    ("xlsx", DocumentKind::Spreadsheet),
    ("xls", DocumentKind::Spreadsheet),
    ("ods", DocumentKind::Spreadsheet),
    ("enex", DocumentKind::NoteExport),
    ("eml", DocumentKind::Email),
    ("epub", DocumentKind::EBook),
    ("html", DocumentKind::Markup),
    ("htm", DocumentKind::Markup),
    ("md", DocumentKind::Markdown),
    ("odt", DocumentKind::OfficeDocument),
    ("ppt", DocumentKind::Presentation),
    ("pptx", DocumentKind::Presentation),
    ("pdf", DocumentKind::PortableDocument),
    ("txt", DocumentKind::PlainText),
];

impl DocumentKind {
    /// Look up the kind for a lower-case extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, kind)| *kind)
    }

    /// Classify a path by its final component's extension.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let extension = extension_of(path);
        Self::from_extension(&extension)
            .ok_or(AppError::UnsupportedFormat { extension })
    }
}

/// Every extension the loader accepts.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    EXTENSIONS.iter().map(|(ext, _)| *ext)
}

/// Whether the loader has a routine for this path.
pub fn is_supported(path: &Path) -> bool {
    DocumentKind::from_extension(&extension_of(path)).is_some()
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Failure inside a single extraction routine.
#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The message has no part of the requested content type.
    #[error("{content_type} content not found in email")]
    ContentNotFound { content_type: String },

    #[error("invalid UTF-8: {0}")]
    Encoding(String),

    #[error("{0}")]
    Format(String),
}

impl LoadError {
    pub(crate) fn format(e: impl std::fmt::Display) -> Self {
        LoadError::Format(e.to_string())
    }
}

/// Load a file into logical documents.
///
/// Unknown extensions fail with `UnsupportedFormat`; anything that goes
/// wrong during extraction fails with `LoaderFailure` naming the path.
pub fn load(path: &Path) -> AppResult<Vec<LogicalDocument>> {
    let kind = DocumentKind::from_path(path)?;
    let source = path.to_string_lossy().to_string();

    tracing::debug!("Loading {} as {:?}", source, kind);

    let result = match kind {
        DocumentKind::DelimitedText => delimited::load_csv(path, &source),
        DocumentKind::WordProcessor => office::load_docx(path, &source),
        DocumentKind::Spreadsheet => spreadsheet::load_workbook(path, &source),
        DocumentKind::NoteExport => evernote::load_enex(path, &source),
        DocumentKind::Email => email::load_eml(path, &source),
        DocumentKind::EBook => epub::load_epub(path, &source),
        DocumentKind::Markup => markup::load_html(path, &source),
        DocumentKind::Markdown => text::load_markdown(path, &source),
        DocumentKind::OfficeDocument => office::load_odt(path, &source),
        DocumentKind::Presentation => office::load_pptx(path, &source),
        DocumentKind::PortableDocument => pdf::load_pdf(path, &source),
        DocumentKind::PlainText => text::load_text(path, &source),
    };

    result.map_err(|e| AppError::LoaderFailure {
        path: source,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dispatch_by_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("a.pdf")).unwrap(),
            DocumentKind::PortableDocument
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("dir/Notes.ENEX")).unwrap(),
            DocumentKind::NoteExport
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("x.htm")).unwrap(),
            DocumentKind::Markup
        );
    }

    #[test]
    fn test_unknown_extension() {
        match DocumentKind::from_path(Path::new("a.unknownext")) {
            Err(AppError::UnsupportedFormat { extension }) => assert_eq!(extension, "unknownext"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_extension() {
        match DocumentKind::from_path(Path::new("Makefile")) {
            Err(AppError::UnsupportedFormat { extension }) => assert!(extension.is_empty()),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_supported_extensions_listed() {
        let all: Vec<_> = supported_extensions().collect();
        assert_eq!(all.len(), 17);
        assert!(all.contains(&"eml"));
        assert!(is_supported(Path::new("deck.PPTX")));
        assert!(!is_supported(Path::new("image.png")));
    }

    #[test]
    fn test_load_failure_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.doc");
        fs::write(&path, b"\xd0\xcf\x11\xe0 not a zip").unwrap();

        match load(&path) {
            Err(AppError::LoaderFailure { path: p, message }) => {
                assert!(p.ends_with("legacy.doc"));
                assert!(!message.is_empty());
            }
            other => panic!("Expected LoaderFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_every_document_has_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("note.md");
        fs::write(&path, "# Title\n\nBody").unwrap();

        let docs = load(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source(), path.to_string_lossy());
    }
}
