//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot backends and
//! associated error types.

use crate::state::IngestionState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during snapshot operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found at {0} (run with --init to create one)")]
    NotFound(PathBuf),

    #[error("Snapshot already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot backends
///
/// A snapshot holds the whole [`IngestionState`]. `save` replaces the previous
/// snapshot as a unit: a failure or crash during `save` must leave the
/// previous snapshot readable.
pub trait SnapshotStore: Send {
    /// Loads the full state
    fn load(&self) -> StorageResult<IngestionState>;

    /// Replaces the stored state with `state`
    fn save(&mut self, state: &IngestionState) -> StorageResult<()>;
}
