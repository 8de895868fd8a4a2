//! EPUB: spine documents in reading order, concatenated.

use super::archive::{self, local, Container};
use super::markup::html_to_text;
use super::LoadError;
use crate::types::LogicalDocument;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;

const CONTAINER_ENTRY: &str = "META-INF/container.xml";

/// What the package document says about the book.
#[derive(Debug, Default)]
struct Package {
    title: Option<String>,
    /// Manifest id -> href, relative to the package document
    manifest: HashMap<String, String>,
    /// Manifest ids in reading order
    spine: Vec<String>,
}

pub(crate) fn load_epub(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut container = archive::open(path)?;

    let container_xml = archive::read_entry(&mut container, CONTAINER_ENTRY)?;
    let package_path = archive::first_attribute(&container_xml, "rootfile", "full-path")?
        .ok_or_else(|| LoadError::Format("container.xml names no rootfile".to_string()))?;

    let package = parse_package(&archive::read_entry(&mut container, &package_path)?)?;
    let base = package_path
        .rsplit_once('/')
        .map(|(dir, _)| format!("{}/", dir))
        .unwrap_or_default();

    let text = read_spine(&mut container, &package, &base)?;

    let mut document = LogicalDocument::new(source, text);
    if let Some(title) = package.title {
        document = document.with_meta("title", title);
    }
    Ok(vec![document])
}

fn read_spine(
    container: &mut Container,
    package: &Package,
    base: &str,
) -> Result<String, LoadError> {
    let mut parts = Vec::with_capacity(package.spine.len());

    for idref in &package.spine {
        let Some(href) = package.manifest.get(idref) else {
            tracing::debug!("Spine item '{}' missing from manifest", idref);
            continue;
        };
        let entry = format!("{}{}", base, href.split('#').next().unwrap_or(href));
        let text = html_to_text(&archive::read_entry(container, &entry)?);
        if !text.is_empty() {
            parts.push(text);
        }
    }

    Ok(parts.join("\n\n"))
}

fn parse_package(xml: &str) -> Result<Package, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut package = Package::default();
    let mut in_title = false;

    loop {
        match reader.read_event().map_err(LoadError::format)? {
            Event::Start(e) if local(e.local_name().into_inner()) == "title" => in_title = true,
            Event::End(e) if local(e.local_name().into_inner()) == "title" => in_title = false,
            Event::Text(e) if in_title && package.title.is_none() => {
                let title = e.unescape().map_err(LoadError::format)?.trim().to_string();
                if !title.is_empty() {
                    package.title = Some(title);
                }
            }
            Event::Start(e) | Event::Empty(e) => match local(e.local_name().into_inner()) {
                "item" => {
                    let id = attribute(&e, "id")?;
                    let href = attribute(&e, "href")?;
                    if let (Some(id), Some(href)) = (id, href) {
                        package.manifest.insert(id, href);
                    }
                }
                "itemref" => {
                    if let Some(idref) = attribute(&e, "idref")? {
                        package.spine.push(idref);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(package)
}

fn attribute(
    element: &quick_xml::events::BytesStart<'_>,
    name: &str,
) -> Result<Option<String>, LoadError> {
    match element.try_get_attribute(name).map_err(LoadError::format)? {
        Some(attr) => Ok(Some(
            attr.unescape_value().map_err(LoadError::format)?.to_string(),
        )),
        None => Ok(None),
    }
}
