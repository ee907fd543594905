//! Snapshot schema definitions
//!
//! This module contains all SQL schema definitions for the snapshot database.

/// Bumped whenever the table layout changes
pub const SCHEMA_VERSION: &str = "1";

/// SQL schema for the snapshot
pub const SCHEMA_SQL: &str = r#"
-- Snapshot metadata (schema version, last save time)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per feed present in the state, including feeds with no history
CREATE TABLE IF NOT EXISTS feeds (
    url TEXT PRIMARY KEY
);

-- Seen identifiers, ordered oldest first by position
CREATE TABLE IF NOT EXISTS seen_entries (
    feed_url TEXT NOT NULL REFERENCES feeds(url) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    identifier TEXT NOT NULL,
    PRIMARY KEY (feed_url, position)
);
"#;

/// Connection settings applied on every open
///
/// Rollback journal (not WAL) keeps the snapshot a single file at rest;
/// FULL sync makes a committed save survive power loss.
pub const PRAGMAS_SQL: &str = "
    PRAGMA journal_mode = DELETE;
    PRAGMA synchronous = FULL;
    PRAGMA foreign_keys = ON;
";

/// Creates all tables and stamps the schema version
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}
