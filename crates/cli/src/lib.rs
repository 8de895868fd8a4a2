//! localqa command line tools.
//!
//! `ingest` builds the local vector index from a source directory and
//! `query` answers questions against it with a local model backend.

pub mod commands;
pub mod output;

pub use commands::{IngestCommand, QueryCommand};
