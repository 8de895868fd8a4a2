//! Ingestion: discover, load, chunk, embed and persist.

use crate::chunker::{Chunker, ChunkerConfig};
use crate::embeddings::EmbeddingProvider;
use crate::loader;
use crate::progress::ProgressReporter;
use crate::store::{index_exists, SqliteVectorStore, VectorStore};
use crate::types::{source_of, Collected, IngestOutcome, IngestReport, LoadFailure, LogicalDocument};
use futures::StreamExt;
use localqa_core::{AppConfig, AppError, AppResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Everything an ingestion run needs from the configuration.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub source_directory: PathBuf,
    pub persist_directory: PathBuf,
    pub chunking: ChunkerConfig,
    pub max_parts_per_run: usize,
    /// Files loaded concurrently
    pub workers: usize,
    /// Texts per embedding call
    pub batch_size: usize,
}

impl IngestOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source_directory: config.source_directory.clone(),
            persist_directory: config.persist_directory.clone(),
            chunking: ChunkerConfig {
                chunk_size: config.chunk_size,
                chunk_overlap: config.chunk_overlap,
            },
            max_parts_per_run: config.max_parts_per_run,
            workers: num_cpus::get(),
            batch_size: 100,
        }
    }
}

/// Supported files under `root`, sorted. Unreadable entries are skipped.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| loader::is_supported(path))
        .collect();

    files.sort();
    files
}

/// Load and chunk every supported file not in `already_indexed`.
pub async fn collect(
    options: &IngestOptions,
    already_indexed: &HashSet<String>,
    progress: &ProgressReporter,
) -> AppResult<Collected> {
    let discovered = discover(&options.source_directory);
    let mut report = IngestReport {
        files_discovered: discovered.len(),
        ..IngestReport::default()
    };

    let pending: Vec<PathBuf> = discovered
        .into_iter()
        .filter(|path| !already_indexed.contains(path.to_string_lossy().as_ref()))
        .collect();
    report.files_skipped = report.files_discovered - pending.len();

    let mut documents =
        load_all(pending, options.workers, loader::load, &mut report, progress).await?;

    if documents.len() > options.max_parts_per_run {
        tracing::warn!(
            "Loaded {} document parts, keeping the first {} (MAX_PARTS_PER_RUN)",
            documents.len(),
            options.max_parts_per_run
        );
        documents.truncate(options.max_parts_per_run);
        report.truncated = true;
    }

    if documents.is_empty() {
        tracing::info!("No new documents to load");
        return Ok(Collected::NoWork);
    }

    tracing::info!(
        "Loaded {} new documents from {}",
        documents.len(),
        options.source_directory.display()
    );
    report.documents = documents.len();

    let chunker = Chunker::new(options.chunking)?;
    let chunks = chunker.split(&documents);
    progress.chunk(documents.len() as u64, chunks.len());

    tracing::info!(
        "Split into {} chunks of text (max. {} characters each)",
        chunks.len(),
        options.chunking.chunk_size
    );
    report.chunks = chunks.len();

    Ok(Collected::Chunks { chunks, report })
}

/// Signature of a file loader run on the blocking pool.
type LoadFn = fn(&Path) -> AppResult<Vec<LogicalDocument>>;

/// Load files on the blocking pool, at most `workers` at a time.
///
/// Per-file failures and loader panics are logged, recorded in `report`
/// and skipped; any other error aborts the run. The result is ordered by
/// path, then by part order within each file.
async fn load_all(
    paths: Vec<PathBuf>,
    workers: usize,
    load: LoadFn,
    report: &mut IngestReport,
    progress: &ProgressReporter,
) -> AppResult<Vec<LogicalDocument>> {
    let total = paths.len() as u64;

    let mut loads = futures::stream::iter(paths.into_iter().enumerate().map(|(order, path)| {
        async move {
            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || load(&task_path)).await;
            (order, path, result)
        }
    }))
    .buffer_unordered(workers.max(1));

    let mut loaded: Vec<(usize, Vec<LogicalDocument>)> = Vec::new();
    let mut done = 0u64;

    while let Some((order, path, result)) = loads.next().await {
        done += 1;
        progress.load(done, total, &path.to_string_lossy());

        let error = match result {
            Ok(Ok(documents)) => {
                report.files_loaded += 1;
                loaded.push((order, documents));
                continue;
            }
            Ok(Err(AppError::LoaderFailure { message, .. })) => message,
            Ok(Err(e)) if e.is_per_file() => e.to_string(),
            Ok(Err(e)) => return Err(e),
            Err(e) => format!("loader task failed: {}", e),
        };

        tracing::warn!("Failed to load {}: {}", path.display(), error);
        report.failures.push(LoadFailure {
            path,
            message: error,
        });
    }

    loaded.sort_by_key(|(order, _)| *order);
    Ok(loaded.into_iter().flat_map(|(_, documents)| documents).collect())
}

/// Run a full ingestion into the persist directory.
///
/// An existing index is appended to and files it already holds are
/// skipped; otherwise a new index is created. Nothing is written when
/// there are no new documents.
pub async fn ingest(
    options: &IngestOptions,
    embedder: Arc<dyn EmbeddingProvider>,
    progress: &ProgressReporter,
) -> AppResult<IngestOutcome> {
    let dir = &options.persist_directory;

    let (existing, already_indexed) = if index_exists(dir) {
        tracing::info!("Appending to existing vectorstore at {}", dir.display());
        let store = SqliteVectorStore::open(dir, embedder.clone())?;
        let indexed: HashSet<String> = store
            .all_metadata()
            .await?
            .iter()
            .filter_map(|metadata| source_of(metadata).map(str::to_string))
            .collect();
        (Some(store), indexed)
    } else {
        tracing::info!("Creating new vectorstore");
        (None, HashSet::new())
    };

    let (chunks, mut report) = match collect(options, &already_indexed, progress).await? {
        Collected::NoWork => return Ok(IngestOutcome::NoNewDocuments),
        Collected::Chunks { chunks, report } => (chunks, report),
    };

    let mut store = match existing {
        Some(store) => store,
        None => SqliteVectorStore::create(dir, embedder.clone(), options.chunking)?,
    }
    .with_batch_size(options.batch_size);

    tracing::info!("Creating embeddings. May take some minutes...");
    progress.embed(chunks.len() as u64, embedder.model_name());

    report.chunks = store.add(chunks).await?;
    store.persist().await?;

    tracing::info!("Ingestion complete! You can now run query to ask questions about your documents");

    Ok(IngestOutcome::Ingested(report))
}
