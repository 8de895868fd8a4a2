//! Ask questions to the local document index.

use clap::Parser;
use localqa::QueryCommand;
use localqa_core::{logging, AppConfig, AppResult};
use std::path::Path;

const DEFAULT_LOG_FILE: &str = "privateGPT.log";

#[tokio::main]
async fn main() -> AppResult<()> {
    let cmd = QueryCommand::parse();
    let config = AppConfig::load()?;

    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_FILE).to_path_buf());
    logging::init_logging(Some(&log_file), config.log_level.as_deref())?;

    let result = cmd.execute(&config).await;
    if let Err(e) = &result {
        tracing::error!("Query failed: {}", e);
    }

    result
}
