//! Storage module for persisting delivery history
//!
//! This module handles the snapshot of the ingestion state:
//! - SQLite snapshot creation, validation and schema management
//! - Whole-state load at startup
//! - Transactional whole-state replacement after every round
//! - Snapshot statistics

mod schema;
mod sqlite;
pub mod stats;
mod traits;

pub use sqlite::SqliteSnapshotStore;
pub use stats::{load_statistics, print_statistics, SnapshotStatistics};
pub use traits::{SnapshotStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the snapshot at `path`, failing if it is missing or unreadable
pub fn open_snapshot(path: &Path) -> StorageResult<SqliteSnapshotStore> {
    SqliteSnapshotStore::open(path)
}

/// Creates a fresh, empty snapshot at `path`
pub fn init_snapshot(path: &Path) -> StorageResult<SqliteSnapshotStore> {
    SqliteSnapshotStore::create(path)
}
