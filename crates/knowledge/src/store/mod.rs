//! Persistent vector store.
//!
//! An index lives in one directory and is made of four artifacts: the
//! SQLite database, the manifest, the source log and the stats file. A
//! directory counts as an index only when enough of them are present.

pub mod manifest;
pub mod sources;
pub mod sqlite;

use crate::types::{Chunk, Metadata, ScoredChunk};
use localqa_core::AppResult;
use std::path::Path;

pub use manifest::IndexManifest;
pub use sources::{IndexedSource, SourceLog};
pub use sqlite::{IndexStats, SqliteVectorStore};

/// Record database.
pub const INDEX_FILE: &str = "index.sqlite";

/// Index manifest (embedding space and chunking).
pub const MANIFEST_FILE: &str = "config.yaml";

/// One line per ingested source.
pub const SOURCES_FILE: &str = "sources.jsonl";

/// Totals written on every persist.
pub const STATS_FILE: &str = "stats.json";

/// Artifacts a directory must hold to count as an existing index.
pub const MIN_INDEX_ARTIFACTS: usize = 4;

const ARTIFACT_EXTENSIONS: &[&str] = &["sqlite", "yaml", "json", "jsonl"];

/// Whether `dir` holds an index.
///
/// True only with at least [`MIN_INDEX_ARTIFACTS`] regular files at the
/// top level whose extension is one of the artifact extensions.
pub fn index_exists(dir: &Path) -> bool {
    artifact_count(dir) >= MIN_INDEX_ARTIFACTS
}

fn artifact_count(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| ARTIFACT_EXTENSIONS.contains(&e))
                .unwrap_or(false)
        })
        .count()
}

/// Vector store over chunk embeddings.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and stage chunks. Returns the number of records added.
    async fn add(&mut self, chunks: Vec<Chunk>) -> AppResult<usize>;

    /// Metadata of every record, in insertion order.
    async fn all_metadata(&self) -> AppResult<Vec<Metadata>>;

    /// The `k` records most similar to `query`, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Make staged records durable.
    async fn persist(&mut self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!index_exists(&temp.path().join("nope")));
    }

    #[test]
    fn test_artifact_threshold() {
        let temp = TempDir::new().unwrap();
        for name in ["index.sqlite", "config.yaml", "sources.jsonl"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }
        assert!(!index_exists(temp.path()));

        fs::write(temp.path().join("stats.json"), b"{}").unwrap();
        assert!(index_exists(temp.path()));
    }

    #[test]
    fn test_only_artifact_files_count() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.sqlite"), b"x").unwrap();
        fs::write(temp.path().join("notes.txt"), b"x").unwrap();
        fs::write(temp.path().join("README"), b"x").unwrap();
        fs::create_dir(temp.path().join("nested.json")).unwrap();
        fs::write(temp.path().join("b.yaml"), b"x").unwrap();
        fs::write(temp.path().join("c.json"), b"x").unwrap();

        assert_eq!(artifact_count(temp.path()), 3);
        assert!(!index_exists(temp.path()));
    }
}
