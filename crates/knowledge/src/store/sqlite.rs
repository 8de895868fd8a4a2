//! SQLite-backed vector store.

use super::manifest::IndexManifest;
use super::sources::{IndexedSource, SourceLog};
use super::{VectorStore, INDEX_FILE, MANIFEST_FILE, SOURCES_FILE, STATS_FILE};
use crate::chunker::ChunkerConfig;
use crate::embeddings::EmbeddingProvider;
use crate::types::{Chunk, Metadata, ScoredChunk};
use chrono::{DateTime, Utc};
use localqa_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_BATCH_SIZE: usize = 100;

/// Totals written to `stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub sources: usize,
    pub records: usize,
    pub last_ingest_at: DateTime<Utc>,
}

/// Vector store kept in a SQLite database plus side artifacts.
///
/// Writes go into one transaction opened by the first [`VectorStore::add`]
/// and committed by [`VectorStore::persist`]. Dropping the store before
/// persisting discards them.
pub struct SqliteVectorStore {
    dir: PathBuf,
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
    manifest: IndexManifest,
    batch_size: usize,
    /// Records per source staged since the last persist
    pending: BTreeMap<String, usize>,
}

impl SqliteVectorStore {
    /// Start a new, empty index in `dir`, replacing any stale artifacts.
    pub fn create(
        dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: ChunkerConfig,
    ) -> AppResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to create index directory {:?}: {}", dir, e))
        })?;

        for name in [INDEX_FILE, MANIFEST_FILE, SOURCES_FILE, STATS_FILE] {
            let path = dir.join(name);
            if path.exists() {
                tracing::debug!("Removing stale index artifact {:?}", path);
                fs::remove_file(&path)?;
            }
        }

        let manifest = IndexManifest::new(&embedder.space(), chunking);
        let conn = init_index(&dir.join(INDEX_FILE))?;

        Ok(Self::with_parts(dir, conn, embedder, manifest))
    }

    /// Open the index in `dir`.
    ///
    /// Fails with `EmbeddingSpaceMismatch` when the index was built with a
    /// different provider, model or dimension than `embedder`.
    pub fn open(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let manifest = IndexManifest::load(&dir.join(MANIFEST_FILE))?;
        manifest
            .embedding_space()
            .validate_consistency(&embedder.space())?;

        let conn = init_index(&dir.join(INDEX_FILE))?;
        tracing::debug!("Opened index at {:?}", dir);

        Ok(Self::with_parts(dir, conn, embedder, manifest))
    }

    fn with_parts(
        dir: &Path,
        conn: Connection,
        embedder: Arc<dyn EmbeddingProvider>,
        manifest: IndexManifest,
    ) -> Self {
        Self {
            dir: dir.to_path_buf(),
            conn: Mutex::new(conn),
            embedder,
            manifest,
            batch_size: DEFAULT_BATCH_SIZE,
            pending: BTreeMap::new(),
        }
    }

    /// Texts per embedding call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Number of records, staged ones included.
    pub fn record_count(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        count(&conn, "SELECT COUNT(*) FROM records")
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Vector store lock poisoned".to_string()))
    }

    fn insert_batch(&mut self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        let conn = self
            .conn
            .get_mut()
            .map_err(|_| AppError::Knowledge("Vector store lock poisoned".to_string()))?;

        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")
                .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let metadata_json = serde_json::to_string(&chunk.metadata)?;

            conn.execute(
                "INSERT INTO records (id, source, position, byte_offset, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    chunk.source(),
                    chunk.position as i64,
                    chunk.byte_offset as i64,
                    chunk.text,
                    embedding_to_bytes(embedding),
                    metadata_json,
                ],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to insert record: {}", e)))?;

            *self.pending.entry(chunk.source().to_string()).or_insert(0) += 1;
        }

        Ok(())
    }

    fn write_side_artifacts(&self, stats: &IndexStats) -> AppResult<()> {
        self.manifest.save(&self.dir.join(MANIFEST_FILE))?;

        let indexed_at = stats.last_ingest_at;
        let sources: Vec<IndexedSource> = self
            .pending
            .iter()
            .map(|(path, chunk_count)| IndexedSource {
                path: path.clone(),
                chunk_count: *chunk_count,
                indexed_at,
            })
            .collect();
        SourceLog::new(&self.dir.join(SOURCES_FILE)).append(&sources)?;

        let json = serde_json::to_string_pretty(stats)?;
        fs::write(self.dir.join(STATS_FILE), json).map_err(|e| {
            AppError::Knowledge(format!("Failed to write {}: {}", STATS_FILE, e))
        })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add(&mut self, chunks: Vec<Chunk>) -> AppResult<usize> {
        let batch_size = self.batch_size;

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::Knowledge(format!(
                    "Embedding provider returned {} vectors for {} texts",
                    embeddings.len(),
                    batch.len()
                )));
            }

            self.insert_batch(batch, &embeddings)?;
        }

        tracing::debug!("Staged {} records", chunks.len());
        Ok(chunks.len())
    }

    async fn all_metadata(&self) -> AppResult<Vec<Metadata>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT metadata FROM records ORDER BY rowid")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Knowledge(format!("Failed to query metadata: {}", e)))?;

        let mut all = Vec::new();
        for row in rows {
            let json = row.map_err(|e| AppError::Knowledge(format!("Failed to read row: {}", e)))?;
            all.push(serde_json::from_str(&json)?);
        }

        Ok(all)
    }

    async fn similarity_search(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT position, byte_offset, text, embedding, metadata
                 FROM records ORDER BY rowid",
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query records: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (position, byte_offset, text, embedding, metadata) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read row: {}", e)))?;

            let score = cosine_similarity(&query_embedding, &bytes_to_embedding(&embedding)?);
            results.push(ScoredChunk {
                chunk: Chunk {
                    text,
                    metadata: serde_json::from_str(&metadata)?,
                    position: position as u32,
                    byte_offset: byte_offset as usize,
                },
                score,
            });
        }

        // Stable sort: equal scores keep insertion order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), k);
        Ok(results)
    }

    async fn persist(&mut self) -> AppResult<()> {
        let stats = {
            let conn = self.lock()?;
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")
                    .map_err(|e| AppError::Knowledge(format!("Failed to commit index: {}", e)))?;
            }

            IndexStats {
                sources: count(&conn, "SELECT COUNT(DISTINCT source) FROM records")?,
                records: count(&conn, "SELECT COUNT(*) FROM records")?,
                last_ingest_at: Utc::now(),
            }
        };

        self.write_side_artifacts(&stats)?;
        self.pending.clear();

        tracing::debug!(
            "Persisted index at {:?}: {} records from {} sources",
            self.dir,
            stats.records,
            stats.sources
        );
        Ok(())
    }
}

impl Drop for SqliteVectorStore {
    fn drop(&mut self) {
        if let Ok(conn) = self.conn.get_mut() {
            if !conn.is_autocommit() {
                tracing::warn!("Discarding records that were never persisted");
                if let Err(e) = conn.execute_batch("ROLLBACK") {
                    tracing::warn!("Rollback failed: {}", e);
                }
            }
        }
    }
}

/// Open the database and create the schema if needed.
fn init_index(db_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            position INTEGER NOT NULL,
            byte_offset INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_records_source ON records(source);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

fn count(conn: &Connection, sql: &str) -> AppResult<usize> {
    conn.query_row(sql, [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .map_err(|e| AppError::Knowledge(format!("Failed to count records: {}", e)))
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
