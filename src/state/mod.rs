//! State module for tracking delivery history
//!
//! # Components
//!
//! - `SeenSet`: bounded, ordered identifiers already delivered for one feed
//! - `IngestionState`: the seen-sets of all subscribed feeds
//! - `mark_and_filter_new`: the dedup step run once per feed per round

mod ingestion_state;
mod seen_set;

// Re-export main types
pub use ingestion_state::IngestionState;
pub use seen_set::{mark_and_filter_new, SeenSet, SEEN_CAPACITY};
