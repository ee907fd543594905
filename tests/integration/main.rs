//! Integration tests for Feed-Courier
//!
//! These tests use wiremock to serve feeds and temporary directories for the
//! snapshot and the drop directory.

mod common;
mod http_source;
mod ingest_cycle;
