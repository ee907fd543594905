//! Configuration module for Feed-Courier
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use feed_courier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("courier.toml")).unwrap();
//! println!("Rounds start every {:?}", config.ingest.round_delay());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DeliveryConfig, FeedGroup, IngestConfig, StorageConfig, Subscription,
    UserAgentConfig, DEFAULT_FETCH_TIMEOUT_MINS, DEFAULT_ROUND_DELAY_SECS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
