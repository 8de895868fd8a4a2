//! Source tracking (`sources.jsonl`).

use chrono::{DateTime, Utc};
use localqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One ingested source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Source path as discovered
    pub path: String,

    /// Records created from this source
    pub chunk_count: usize,

    /// When the records were persisted
    pub indexed_at: DateTime<Utc>,
}

/// Append-only log of ingested sources.
pub struct SourceLog {
    path: PathBuf,
}

impl SourceLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Append sources, one JSON line each.
    pub fn append(&self, sources: &[IndexedSource]) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open sources.jsonl: {}", e)))?;

        for source in sources {
            let json_line = serde_json::to_string(source)
                .map_err(|e| AppError::Knowledge(format!("Failed to serialize source: {}", e)))?;

            writeln!(file, "{}", json_line).map_err(|e| {
                AppError::Knowledge(format!("Failed to write to sources.jsonl: {}", e))
            })?;
        }

        file.sync_all()
            .map_err(|e| AppError::Knowledge(format!("Failed to sync sources.jsonl: {}", e)))?;

        tracing::debug!("Tracked {} sources", sources.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use tempfile::TempDir;

    impl SourceLog {
        /// Read back every tracked source.
        fn list(&self) -> AppResult<Vec<IndexedSource>> {
            if !self.path.exists() {
                return Ok(Vec::new());
            }

            let file = File::open(&self.path)
                .map_err(|e| AppError::Knowledge(format!("Failed to open sources.jsonl: {}", e)))?;

            let mut sources = Vec::new();
            for (line_num, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| {
                    AppError::Knowledge(format!("Failed to read line {}: {}", line_num + 1, e))
                })?;

                if line.trim().is_empty() {
                    continue;
                }

                let source: IndexedSource = serde_json::from_str(&line).map_err(|e| {
                    AppError::Knowledge(format!(
                        "Failed to parse line {} in sources.jsonl: {}",
                        line_num + 1,
                        e
                    ))
                })?;

                sources.push(source);
            }

            Ok(sources)
        }
    }

    fn source(path: &str, chunks: usize) -> IndexedSource {
        IndexedSource {
            path: path.to_string(),
            chunk_count: chunks,
            indexed_at: Utc::now(),
        }
    }

    #[test]
    fn test_appends_accumulate() {
        let temp = TempDir::new().unwrap();
        let log = SourceLog::new(&temp.path().join("sources.jsonl"));

        log.append(&[source("a.txt", 2), source("b.md", 5)]).unwrap();
        log.append(&[source("c.pdf", 1)]).unwrap();

        let sources = log.list().unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].path, "a.txt");
        assert_eq!(sources[2].chunk_count, 1);
    }
}
