//! Zip container and XML helpers shared by the OOXML, ODF and EPUB loaders.

use super::LoadError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Maximum decompressed bytes read from a single zip entry.
const MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

pub(crate) type Container = zip::ZipArchive<BufReader<File>>;

/// Open a zip container.
pub(crate) fn open(path: &Path) -> Result<Container, LoadError> {
    let file = File::open(path)?;
    zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| LoadError::Format(format!("not a zip container: {}", e)))
}

/// Read a UTF-8 entry, refusing entries above the size limit.
pub(crate) fn read_entry(archive: &mut Container, name: &str) -> Result<String, LoadError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| LoadError::Format(format!("{}: {}", name, e)))?;

    let mut out = Vec::new();
    entry.take(MAX_ENTRY_BYTES).read_to_end(&mut out)?;
    if out.len() as u64 >= MAX_ENTRY_BYTES {
        return Err(LoadError::Format(format!(
            "{} exceeds size limit ({} bytes)",
            name, MAX_ENTRY_BYTES
        )));
    }

    String::from_utf8(out).map_err(|e| LoadError::Encoding(format!("{}: {}", name, e)))
}

/// Which elements carry text and which end a line.
pub(crate) struct TextLayout<'a> {
    /// Text is only collected inside these elements
    pub text: &'a [&'a str],
    /// Closing (or empty) tags that emit a line break
    pub breaks: &'a [&'a str],
    /// Empty tags standing for a tab or space
    pub spaces: &'a [&'a str],
}

/// Collect the text of an XML document according to `layout`.
///
/// Names are matched without namespace prefix. Lines are trimmed and
/// empty lines dropped.
pub(crate) fn element_text(xml: &str, layout: &TextLayout<'_>) -> Result<String, LoadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event().map_err(LoadError::format)? {
            Event::Start(e) => {
                if layout.text.contains(&local(e.local_name().into_inner())) {
                    depth += 1;
                }
            }
            Event::End(e) => {
                let name = local(e.local_name().into_inner());
                if layout.text.contains(&name) {
                    depth = depth.saturating_sub(1);
                }
                if layout.breaks.contains(&name) {
                    out.push('\n');
                }
            }
            Event::Empty(e) => {
                let name = local(e.local_name().into_inner());
                if layout.breaks.contains(&name) {
                    out.push('\n');
                } else if layout.spaces.contains(&name) {
                    out.push(' ');
                }
            }
            Event::Text(e) if depth > 0 => {
                out.push_str(&e.unescape().map_err(LoadError::format)?);
            }
            Event::CData(e) if depth > 0 => {
                out.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(tidy_lines(&out))
}

/// Value of the first `attribute` on an element named `element`.
pub(crate) fn first_attribute(
    xml: &str,
    element: &str,
    attribute: &str,
) -> Result<Option<String>, LoadError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event().map_err(LoadError::format)? {
            Event::Start(e) | Event::Empty(e) if local(e.local_name().into_inner()) == element => {
                if let Some(attr) = e.try_get_attribute(attribute).map_err(LoadError::format)? {
                    let value = attr.unescape_value().map_err(LoadError::format)?;
                    return Ok(Some(value.to_string()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

pub(crate) fn local(name: &[u8]) -> &str {
    std::str::from_utf8(name).unwrap_or_default()
}

pub(crate) fn tidy_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
