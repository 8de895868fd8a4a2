//! Evernote export (`.enex`): one document per note.

use super::archive::local;
use super::markup::html_to_text;
use super::text::read_utf8;
use super::LoadError;
use crate::types::LogicalDocument;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Content,
}

#[derive(Debug, Default)]
struct Note {
    title: String,
    content: String,
}

impl Note {
    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Content => self.content.push_str(text),
        }
    }

    fn into_document(self, source: &str) -> LogicalDocument {
        let title = self.title.trim().to_string();
        let body = html_to_text(&self.content);

        let text = match (title.is_empty(), body.is_empty()) {
            (false, false) => format!("{}\n\n{}", title, body),
            (false, true) => title.clone(),
            _ => body,
        };

        LogicalDocument::new(source, text).with_meta("title", title)
    }
}

pub(crate) fn load_enex(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let xml = read_utf8(path)?;
    let notes = parse_notes(&xml)?;
    Ok(notes
        .into_iter()
        .map(|note| note.into_document(source))
        .collect())
}

fn parse_notes(xml: &str) -> Result<Vec<Note>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut notes = Vec::new();
    let mut current: Option<Note> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(LoadError::format)? {
            Event::Start(e) => match local(e.local_name().into_inner()) {
                "note" => current = Some(Note::default()),
                "title" if current.is_some() => field = Some(Field::Title),
                "content" if current.is_some() => field = Some(Field::Content),
                _ => {}
            },
            Event::End(e) => match local(e.local_name().into_inner()) {
                "note" => {
                    notes.extend(current.take());
                    field = None;
                }
                "title" | "content" => field = None,
                _ => {}
            },
            Event::Text(e) => {
                if let (Some(note), Some(f)) = (current.as_mut(), field) {
                    let text = e.unescape().map_err(LoadError::format)?;
                    note.push(f, &text);
                }
            }
            Event::CData(e) => {
                if let (Some(note), Some(f)) = (current.as_mut(), field) {
                    note.push(f, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-export SYSTEM "http://xml.evernote.com/pub/evernote-export3.dtd">
<en-export>
  <note>
    <title>Groceries</title>
    <content><![CDATA[<?xml version="1.0" encoding="UTF-8"?><en-note><div>milk</div><div>eggs</div></en-note>]]></content>
    <created>20230101T000000Z</created>
  </note>
  <note>
    <title>Empty</title>
    <content><![CDATA[<en-note></en-note>]]></content>
  </note>
</en-export>"#;

    #[test]
    fn test_note_per_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.enex");
        fs::write(&path, EXPORT).unwrap();

        let docs = load_enex(&path, "notes.enex").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "Groceries\n\nmilk\neggs");
        assert_eq!(docs[0].metadata["title"], "Groceries");
        assert_eq!(docs[1].text, "Empty");
    }
}
