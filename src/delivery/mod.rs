//! Delivery module for staging outbound messages
//!
//! This module handles:
//! - The JSON payload read by the external delivery agent
//! - The `DeliverySink` seam used by the scheduler
//! - Crash-tolerant drop-directory writes with bounded retry

mod drop_dir;
mod message;
mod traits;

pub use drop_dir::DropDirSink;
pub use message::{ChatId, OutboundMessage};
pub use traits::{DeliveryError, DeliveryResult, DeliverySink};
