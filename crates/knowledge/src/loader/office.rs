//! Office documents: Word (docx), PowerPoint (pptx) and OpenDocument text.
//!
//! Legacy binary `.doc` and `.ppt` files are not zip containers and fail
//! with a format error.

use super::archive::{self, TextLayout};
use super::LoadError;
use crate::types::LogicalDocument;
use std::path::Path;

const DOCX_LAYOUT: TextLayout<'static> = TextLayout {
    text: &["t"],
    breaks: &["p", "br", "cr"],
    spaces: &["tab"],
};

const PPTX_LAYOUT: TextLayout<'static> = TextLayout {
    text: &["t"],
    breaks: &["p", "br"],
    spaces: &[],
};

const ODT_LAYOUT: TextLayout<'static> = TextLayout {
    text: &["p", "h"],
    breaks: &["p", "h", "line-break"],
    spaces: &["s", "tab"],
};

pub(crate) fn load_docx(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut container = archive::open(path)?;
    let xml = archive::read_entry(&mut container, "word/document.xml")?;
    let text = archive::element_text(&xml, &DOCX_LAYOUT)?;
    Ok(vec![LogicalDocument::new(source, text)])
}

pub(crate) fn load_odt(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut container = archive::open(path)?;
    let xml = archive::read_entry(&mut container, "content.xml")?;
    let text = archive::element_text(&xml, &ODT_LAYOUT)?;
    Ok(vec![LogicalDocument::new(source, text)])
}

pub(crate) fn load_pptx(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut container = archive::open(path)?;

    let mut slides: Vec<(u32, String)> = container
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort();

    let mut sections = Vec::with_capacity(slides.len());
    for (number, name) in &slides {
        let xml = archive::read_entry(&mut container, name)?;
        let text = archive::element_text(&xml, &PPTX_LAYOUT)?;
        sections.push(format!("Slide {}:\n{}", number, text));
    }

    Ok(vec![LogicalDocument::new(source, sections.join("\n\n"))
        .with_meta("slides", slides.len())])
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_docx_paragraphs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.docx");
        write_zip(
            &path,
            &[(
                "word/document.xml",
                r#"<w:document xmlns:w="x"><w:body><w:p><w:r><w:t>First</w:t></w:r></w:p><w:p><w:r><w:t>Second</w:t></w:r></w:p></w:body></w:document>"#,
            )],
        );

        let docs = load_docx(&path, "a.docx").unwrap();
        assert_eq!(docs[0].text, "First\nSecond");
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deck.pptx");
        let slide = |text: &str| format!(r#"<p:sld xmlns:a="a" xmlns:p="p"><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:sld>"#, text);
        let (s1, s2, s10) = (slide("one"), slide("two"), slide("ten"));
        write_zip(
            &path,
            &[
                ("ppt/slides/slide10.xml", s10.as_str()),
                ("ppt/slides/slide2.xml", s2.as_str()),
                ("ppt/slides/slide1.xml", s1.as_str()),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ],
        );

        let docs = load_pptx(&path, "deck.pptx").unwrap();
        assert_eq!(
            docs[0].text,
            "Slide 1:\none\n\nSlide 2:\ntwo\n\nSlide 10:\nten"
        );
        assert_eq!(docs[0].metadata["slides"], 3);
    }

    #[test]
    fn test_odt_headings_and_paragraphs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.odt");
        write_zip(
            &path,
            &[(
                "content.xml",
                r#"<office:document-content xmlns:office="o" xmlns:text="t"><office:body><office:text><text:h>Title</text:h><text:p>Some<text:s/><text:span>text</text:span></text:p></office:text></office:body></office:document-content>"#,
            )],
        );

        let docs = load_odt(&path, "a.odt").unwrap();
        assert_eq!(docs[0].text, "Title\nSome text");
    }

    #[test]
    fn test_binary_ppt_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.ppt");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1").unwrap();

        assert!(load_pptx(&path, "old.ppt").is_err());
    }
}
