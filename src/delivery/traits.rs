//! Delivery sink trait and error types

use crate::delivery::ChatId;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging a message
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Could not write message to {dir} after {attempts} attempts: {source}")]
    Exhausted {
        dir: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for delivery operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Hands outbound messages to whatever transports them
///
/// An `Err` means the message could not be handed over at all and the
/// caller must treat it as fatal; transient trouble is retried inside.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Delivers `caption` as a text message to `destination`
    async fn deliver(&self, caption: &str, destination: ChatId) -> DeliveryResult<()>;
}
