//! Command handlers for the localqa tools.

pub mod ingest;
pub mod query;

pub use ingest::IngestCommand;
pub use query::QueryCommand;
