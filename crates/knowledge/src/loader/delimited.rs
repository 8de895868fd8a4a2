//! CSV: one document per data row.
//!
//! Rows may be ragged. Cells past the header row are named by their
//! 1-based column position.

use super::LoadError;
use crate::types::LogicalDocument;
use std::path::Path;

pub(crate) fn load_csv(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(LoadError::format)?;

    let headers = reader.headers().map_err(LoadError::format)?.clone();

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(LoadError::format)?;

        let text = record
            .iter()
            .enumerate()
            .map(|(column, value)| match headers.get(column) {
                Some(header) => format!("{}: {}", header.trim(), value.trim()),
                None => format!("column_{}: {}", column + 1, value.trim()),
            })
            .collect::<Vec<_>>()
            .join("\n");

        documents.push(LogicalDocument::new(source, text).with_meta("row", row));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_row_per_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("animals.csv");
        fs::write(&path, "name,class\ncat,mammal\ntrout, fish\n").unwrap();

        let docs = load_csv(&path, "animals.csv").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "name: cat\nclass: mammal");
        assert_eq!(docs[1].text, "name: trout\nclass: fish");
        assert_eq!(docs[1].metadata["row"], 1);
        assert_eq!(docs[1].source(), "animals.csv");
    }

    #[test]
    fn test_ragged_rows_keep_every_cell() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ragged.csv");
        fs::write(&path, "name,class\ncat,mammal,purrs,naps\ntrout\n").unwrap();

        let docs = load_csv(&path, "ragged.csv").unwrap();
        assert_eq!(
            docs[0].text,
            "name: cat\nclass: mammal\ncolumn_3: purrs\ncolumn_4: naps"
        );
        assert_eq!(docs[1].text, "name: trout");
    }

    #[test]
    fn test_header_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.csv");
        fs::write(&path, "a,b\n").unwrap();

        assert!(load_csv(&path, "empty.csv").unwrap().is_empty());
    }
}
