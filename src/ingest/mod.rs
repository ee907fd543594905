//! Ingestion module: fetching feeds and driving rounds
//!
//! This module contains the core polling logic, including:
//! - The feed item model and identifier derivation
//! - RSS/Atom parsing
//! - HTTP fetching bounded by a timeout
//! - Retry with pacing and linear backoff
//! - The round scheduler tying fetch, dedup, delivery and persistence together

mod fetcher;
mod item;
mod parser;
mod retry;
mod scheduler;

pub use fetcher::{build_http_client, FeedSource, HttpFeedSource};
pub use item::FeedItem;
pub use parser::parse_feed;
pub use retry::{try_fetch, Attempt, RetryPolicy, Step};
pub use scheduler::{RoundReport, Scheduler, SchedulerSettings};

use std::time::Duration;
use thiserror::Error;

/// Errors from a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status}")]
    Status {
        url: String,
        status: u16,
        /// Items parsed from the error response body, if it was a feed
        recovered: Vec<FeedItem>,
    },

    #[error("feed parse error: {source}")]
    Parse {
        url: String,
        #[source]
        source: feed_rs::parser::ParseFeedError,
    },

    /// A shutdown request arrived before the fetch settled
    #[error("interrupted by shutdown")]
    Interrupted { url: String },
}

impl FetchError {
    /// URL of the feed that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Http { url, .. }
            | Self::Status { url, .. }
            | Self::Parse { url, .. }
            | Self::Interrupted { url } => url,
        }
    }

    /// Items that could still be read despite the failure
    pub fn recovered_items(&self) -> &[FeedItem] {
        match self {
            Self::Status { recovered, .. } => recovered,
            _ => &[],
        }
    }
}
