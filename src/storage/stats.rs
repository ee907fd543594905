//! Statistics over a stored snapshot
//!
//! Backs the `--stats` command line mode.

use crate::storage::{SnapshotStore, SqliteSnapshotStore, StorageResult};

/// Snapshot statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStatistics {
    /// Number of feeds with recorded history
    pub feeds: usize,

    /// Identifiers across all feeds
    pub total_entries: usize,

    /// Feed with the longest seen-set and its length
    pub largest_feed: Option<(String, usize)>,

    /// Feeds whose seen-set is empty
    pub empty_feeds: usize,

    /// RFC 3339 timestamp of the last save
    pub saved_at: Option<String>,
}

/// Loads statistics from a snapshot
pub fn load_statistics(store: &SqliteSnapshotStore) -> StorageResult<SnapshotStatistics> {
    let state = store.load()?;

    let largest_feed = state
        .iter()
        .max_by_key(|(_, seen)| seen.len())
        .map(|(url, seen)| (url.to_string(), seen.len()));

    Ok(SnapshotStatistics {
        feeds: state.len(),
        total_entries: state.total_entries(),
        largest_feed,
        empty_feeds: state.iter().filter(|(_, seen)| seen.is_empty()).count(),
        saved_at: store.saved_at()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SnapshotStatistics) {
    println!("=== Snapshot Statistics ===\n");

    println!("Overview:");
    println!("  Feeds: {}", stats.feeds);
    println!("  Recorded identifiers: {}", stats.total_entries);
    println!("  Feeds without history: {}", stats.empty_feeds);
    if let Some((url, len)) = &stats.largest_feed {
        println!("  Largest history: {} ({} entries)", url, len);
    }
    println!();

    match &stats.saved_at {
        Some(ts) => println!("Last saved: {}", ts),
        None => println!("Last saved: never"),
    }
}
