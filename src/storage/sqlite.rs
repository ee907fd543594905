//! SQLite snapshot implementation
//!
//! This module provides a SQLite-based implementation of the SnapshotStore trait.

use crate::state::{IngestionState, SeenSet};
use crate::storage::schema::{initialize_schema, PRAGMAS_SQL, SCHEMA_VERSION};
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQLite snapshot backend
pub struct SqliteSnapshotStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSnapshotStore {
    /// Opens an existing snapshot
    ///
    /// Never creates a file: a missing snapshot is [`StorageError::NotFound`],
    /// and a file that is not a valid snapshot is [`StorageError::Corrupt`].
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.verify().map_err(|e| match e {
            StorageError::Sqlite(inner) => {
                StorageError::Corrupt(format!("{}: {}", store.path.display(), inner))
            }
            other => other,
        })?;

        Ok(store)
    }

    /// Creates a new, empty snapshot
    ///
    /// Refuses to touch an existing file.
    pub fn create(path: &Path) -> StorageResult<Self> {
        if path.exists() {
            return Err(StorageError::AlreadyExists(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(PRAGMAS_SQL)?;
        initialize_schema(&conn)?;

        let mut store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.save(&IngestionState::new())?;
        Ok(store)
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp (RFC 3339) of the last successful save
    pub fn saved_at(&self) -> StorageResult<Option<String>> {
        let saved_at = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'saved_at'", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(saved_at)
    }

    fn verify(&self) -> StorageResult<()> {
        self.conn.execute_batch(PRAGMAS_SQL)?;

        let check: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))?;
        if check != "ok" {
            return Err(StorageError::Corrupt(format!(
                "{}: integrity check reported '{}'",
                self.path.display(),
                check
            )));
        }

        let version: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match version.as_deref() {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(StorageError::Corrupt(format!(
                "{}: unsupported schema version {}",
                self.path.display(),
                other
            ))),
            None => Err(StorageError::Corrupt(format!(
                "{}: missing schema version",
                self.path.display()
            ))),
        }
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> StorageResult<IngestionState> {
        let mut feed_stmt = self.conn.prepare("SELECT url FROM feeds ORDER BY url")?;
        let urls = feed_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entry_stmt = self.conn.prepare(
            "SELECT identifier FROM seen_entries WHERE feed_url = ?1 ORDER BY position",
        )?;

        let mut state = IngestionState::new();
        for url in urls {
            let seen = entry_stmt
                .query_map(params![url], |row| row.get::<_, String>(0))?
                .collect::<Result<SeenSet, _>>()?;
            state.insert(url, seen);
        }

        tracing::debug!(
            "Loaded snapshot with {} feeds, {} identifiers",
            state.len(),
            state.total_entries()
        );
        Ok(state)
    }

    fn save(&mut self, state: &IngestionState) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM seen_entries", [])?;
        tx.execute("DELETE FROM feeds", [])?;

        {
            let mut insert_feed = tx.prepare("INSERT INTO feeds (url) VALUES (?1)")?;
            let mut insert_entry = tx.prepare(
                "INSERT INTO seen_entries (feed_url, position, identifier) VALUES (?1, ?2, ?3)",
            )?;

            for (url, seen) in state.iter() {
                insert_feed.execute(params![url])?;
                for (position, identifier) in seen.iter().enumerate() {
                    insert_entry.execute(params![url, position as i64, identifier])?;
                }
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('saved_at', ?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }
}
