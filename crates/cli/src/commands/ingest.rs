//! Ingest command handler.
//!
//! Loads every new document under the source directory into the index.

use crate::output::stderr_progress;
use clap::Parser;
use localqa_core::{AppConfig, AppResult};
use localqa_knowledge::{create_provider, ingest, EmbeddingConfig, IngestOptions, IngestOutcome};

/// Build or extend the local document index
#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load documents from the source directory into the local vector index", long_about = None)]
#[command(version)]
pub struct IngestCommand {}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Source directory: {:?}", config.source_directory);
        tracing::debug!("Persist directory: {:?}", config.persist_directory);

        let embedding_config = EmbeddingConfig::from(&config.embeddings);
        let embedder = create_provider(&embedding_config).await?;

        let options = IngestOptions::from_config(config);
        let outcome = ingest(&options, embedder, &stderr_progress()).await?;

        match outcome {
            IngestOutcome::NoNewDocuments => {
                tracing::debug!("Index already up to date");
            }
            IngestOutcome::Ingested(report) => {
                tracing::debug!(
                    "{} files loaded, {} skipped, {} failed, {} chunks stored",
                    report.files_loaded,
                    report.files_skipped,
                    report.failures.len(),
                    report.chunks
                );
            }
        }

        Ok(())
    }
}
