//! Drop-directory sink
//!
//! Each message becomes one JSON file in a directory watched by an external
//! delivery agent. A message file is first written and synced under a hidden
//! name (`.<prefix><random>`) and then renamed to `<prefix><random>` without
//! clobbering, so the agent never picks up a partial file. The hidden file is
//! a `NamedTempFile` and is removed whenever a write attempt fails.

use crate::config::DeliveryConfig;
use crate::delivery::{ChatId, DeliveryError, DeliveryResult, DeliverySink, OutboundMessage};
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Random characters in a message filename
const NAME_RAND_LEN: usize = 12;

/// [`DeliverySink`] that stages messages as files
#[derive(Debug, Clone)]
pub struct DropDirSink {
    dir: PathBuf,
    prefix: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl DropDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "rss_".to_string(),
            max_attempts: 99,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(&config.drop_dir)
            .with_prefix(config.file_prefix.clone())
            .with_retry(config.max_write_attempts, config.write_retry_delay())
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `message` into the drop directory and returns the file path
    ///
    /// Failed attempts are retried after a fixed delay, up to the configured
    /// number of attempts.
    pub async fn stage(&self, message: &OutboundMessage) -> DeliveryResult<PathBuf> {
        let body = serde_json::to_vec(message)?;
        let mut attempt = 1;

        loop {
            let dir = self.dir.clone();
            let prefix = self.prefix.clone();
            let payload = body.clone();

            let result = tokio::task::spawn_blocking(move || write_slot(&dir, &prefix, &payload))
                .await
                .unwrap_or_else(|e| Err(io::Error::other(e)));

            match result {
                Ok(path) => {
                    tracing::debug!("Staged message for chat {} at {}", message.chat_id, path.display());
                    return Ok(path);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Write attempt {}/{} in {} failed: {}",
                        attempt,
                        self.max_attempts,
                        self.dir.display(),
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(DeliveryError::Exhausted {
                        dir: self.dir.clone(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl DeliverySink for DropDirSink {
    async fn deliver(&self, caption: &str, destination: ChatId) -> DeliveryResult<()> {
        self.stage(&OutboundMessage::send_text(caption, destination))
            .await
            .map(|_| ())
    }
}

/// One write attempt: hidden temp file, sync, rename into place
fn write_slot(dir: &Path, prefix: &str, body: &[u8]) -> io::Result<PathBuf> {
    let mut slot = tempfile::Builder::new()
        .prefix(&format!(".{}", prefix))
        .rand_bytes(NAME_RAND_LEN)
        .tempfile_in(dir)?;

    slot.write_all(body)?;
    slot.as_file().sync_all()?;

    let visible_name = slot
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix('.'))
        .map(str::to_string)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unexpected slot name"))?;

    let final_path = dir.join(visible_name);
    slot.persist_noclobber(&final_path).map_err(|e| e.error)?;
    Ok(final_path)
}
