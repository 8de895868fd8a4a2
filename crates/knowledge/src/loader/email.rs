//! RFC 822 mail (`.eml`).
//!
//! The HTML body is preferred. A message with no `text/html` part is
//! loaded a second time from its `text/plain` part.

use super::markup::html_to_text;
use super::LoadError;
use crate::types::LogicalDocument;
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use std::fs;
use std::path::Path;

/// Body part a load attempt reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentSource {
    Html,
    Plain,
}

impl ContentSource {
    fn mimetype(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Plain => "text/plain",
        }
    }
}

pub(crate) fn load_eml(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let raw = fs::read(path)?;

    match load_from(&raw, source, ContentSource::Html) {
        Err(LoadError::ContentNotFound { content_type }) => {
            tracing::debug!("{} has no {} part, retrying with text/plain", source, content_type);
            load_from(&raw, source, ContentSource::Plain)
        }
        other => other,
    }
}

fn load_from(
    raw: &[u8],
    source: &str,
    content: ContentSource,
) -> Result<Vec<LogicalDocument>, LoadError> {
    let mail = mailparse::parse_mail(raw).map_err(LoadError::format)?;

    let part = find_part(&mail, content.mimetype()).ok_or_else(|| LoadError::ContentNotFound {
        content_type: content.mimetype().to_string(),
    })?;
    let body = part.get_body().map_err(LoadError::format)?;

    let text = match content {
        ContentSource::Html => html_to_text(&body),
        ContentSource::Plain => body.trim().to_string(),
    };

    let mut document = LogicalDocument::new(source, text);
    for (header, key) in [("Subject", "subject"), ("From", "from"), ("To", "to")] {
        if let Some(value) = mail.headers.get_first_value(header) {
            document = document.with_meta(key, value);
        }
    }

    Ok(vec![document])
}

/// Depth-first search for the first inline part of `mimetype`.
fn find_part<'m, 'a>(mail: &'m ParsedMail<'a>, mimetype: &str) -> Option<&'m ParsedMail<'a>> {
    if mail.get_content_disposition().disposition == DispositionType::Attachment {
        return None;
    }

    if mail.subparts.is_empty() {
        return (mail.ctype.mimetype.eq_ignore_ascii_case(mimetype)).then_some(mail);
    }

    mail.subparts
        .iter()
        .find_map(|part| find_part(part, mimetype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAIN_ONLY: &str = "From: alice@example.com\r\n\
To: bob@example.com\r\n\
Subject: Cats\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Cats are mammals.\r\n";

    const ALTERNATIVE: &str = "From: alice@example.com\r\n\
Subject: Dogs\r\n\
Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
\r\n\
--b1\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
plain dogs\r\n\
--b1\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<html><body><p>Dogs are <b>loyal</b>.</p></body></html>\r\n\
--b1--\r\n";

    fn write(temp: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_html_part_preferred() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "dogs.eml", ALTERNATIVE);

        let docs = load_eml(&path, "dogs.eml").unwrap();
        assert_eq!(docs[0].text, "Dogs are loyal.");
        assert_eq!(docs[0].metadata["subject"], "Dogs");
    }

    #[test]
    fn test_plain_text_fallback() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "cats.eml", PLAIN_ONLY);

        let docs = load_eml(&path, "cats.eml").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "Cats are mammals.");
        assert_eq!(docs[0].metadata["from"], "alice@example.com");
        assert_eq!(docs[0].metadata["to"], "bob@example.com");
    }

    #[test]
    fn test_missing_html_is_content_not_found() {
        let err = load_from(PLAIN_ONLY.as_bytes(), "cats.eml", ContentSource::Html).unwrap_err();
        assert_eq!(err.to_string(), "text/html content not found in email");
    }

    #[test]
    fn test_no_body_at_all() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "img.eml",
            "Subject: pic\r\nContent-Type: image/png\r\n\r\nAAAA\r\n",
        );

        let err = load_eml(&path, "img.eml").unwrap_err();
        assert_eq!(err.to_string(), "text/plain content not found in email");
    }
}
