//! Cross-module tests running the full ingest and answer pipeline.
