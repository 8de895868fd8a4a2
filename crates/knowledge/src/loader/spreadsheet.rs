//! Spreadsheets (xlsx, xls, ods): one document per non-empty sheet.

use super::LoadError;
use crate::types::LogicalDocument;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub(crate) fn load_workbook(path: &Path, source: &str) -> Result<Vec<LogicalDocument>, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(LoadError::format)?;

    let mut documents = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| LoadError::Format(format!("sheet '{}': {}", sheet, e)))?;

        let rows: Vec<String> = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(cell_text)
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .filter(|line| line.chars().any(|c| c != '|' && !c.is_whitespace()))
            .collect();

        if rows.is_empty() {
            continue;
        }

        documents.push(LogicalDocument::new(source, rows.join("\n")).with_meta("sheet", sheet));
    }

    Ok(documents)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
    }
}
