//! Feed-Courier: a scheduled feed-ingestion engine
//!
//! This crate polls a configured set of RSS/Atom feeds, detects items that were
//! not delivered before, stages one message per new item in a drop directory,
//! and durably remembers what it has already delivered so that restarts do not
//! re-deliver old items.

pub mod config;
pub mod delivery;
pub mod ingest;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Feed-Courier operations
///
/// Every variant that reaches the scheduler loop is fatal: per-feed fetch
/// failures are handled inside a round and never surface here.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] delivery::DeliveryError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Feed {url} is subscribed for both chat {first} and chat {second}")]
    ConflictingDestination { url: String, first: i64, second: i64 },
}

/// Result type alias for Feed-Courier operations
pub type Result<T> = std::result::Result<T, CourierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Subscription};
pub use delivery::{ChatId, DeliverySink, DropDirSink};
pub use ingest::{FeedItem, FeedSource, HttpFeedSource, RetryPolicy, Scheduler};
pub use state::{mark_and_filter_new, IngestionState, SeenSet};
pub use storage::{SnapshotStore, SqliteSnapshotStore};
