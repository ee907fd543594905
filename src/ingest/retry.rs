//! Bounded retry around a [`FeedSource`]
//!
//! A fetch is a small state machine:
//!
//! ```text
//! Attempt{1} --ok--> Success
//!     |fail
//!     v
//! Retry{Attempt{2}, backoff = 1 * step} --> ... --> Attempt{max_retries + 1} --fail--> Exhausted
//! ```
//!
//! Every attempt, the first one included, is preceded by the pacing delay.
//! The delay arithmetic lives on [`RetryPolicy`] and [`Attempt`] so it can be
//! tested without touching a clock.

use crate::ingest::{FeedItem, FeedSource, FetchError};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Retry parameters for one feed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Sleep before every attempt
    pub pacing: Duration,

    /// Added backoff per failed attempt
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, pacing: Duration, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            pacing,
            backoff_step,
        }
    }

    /// Total number of tries, first attempt included
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Extra wait after the given (1-based) attempt failed
    pub fn backoff_after(&self, failed_attempt: u32) -> Duration {
        self.backoff_step * failed_attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(120), Duration::from_secs(1))
    }
}

/// The attempt currently in flight (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt(u32);

/// What to do after an attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Retry { next: Attempt, backoff: Duration },
    Exhausted,
}

impl Attempt {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Transition taken when this attempt failed
    pub fn on_failure(self, policy: &RetryPolicy) -> Step {
        if self.0 >= policy.total_attempts() {
            Step::Exhausted
        } else {
            Step::Retry {
                next: Self(self.0 + 1),
                backoff: policy.backoff_after(self.0),
            }
        }
    }
}

/// Fetches a feed, retrying per `policy`
///
/// Only the error of the final attempt is returned. When `shutdown` turns true
/// during a sleep or a fetch, the attempt is abandoned with
/// [`FetchError::Interrupted`].
pub async fn try_fetch(
    source: &dyn FeedSource,
    url: &str,
    policy: &RetryPolicy,
    timeout: Duration,
    shutdown: Option<watch::Receiver<bool>>,
) -> Result<Vec<FeedItem>, FetchError> {
    let mut shutdown = shutdown;
    let interrupted = || FetchError::Interrupted {
        url: url.to_string(),
    };
    let mut attempt = Attempt::first();

    loop {
        unless_shutdown(tokio::time::sleep(policy.pacing), &mut shutdown)
            .await
            .ok_or_else(interrupted)?;

        let error = match unless_shutdown(source.fetch(url, timeout), &mut shutdown)
            .await
            .ok_or_else(interrupted)?
        {
            Ok(items) => return Ok(items),
            Err(e) => e,
        };

        match attempt.on_failure(policy) {
            Step::Retry { next, backoff } => {
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt.number(),
                    policy.total_attempts(),
                    url,
                    error
                );
                attempt = next;
                unless_shutdown(tokio::time::sleep(backoff), &mut shutdown)
                    .await
                    .ok_or_else(interrupted)?;
            }
            Step::Exhausted => return Err(error),
        }
    }
}

/// Drives `fut` to completion unless a shutdown is requested first
///
/// Returns `None` when the shutdown won. A closed channel can no longer
/// request anything, so `fut` then simply runs to completion.
async fn unless_shutdown<F: Future>(
    fut: F,
    shutdown: &mut Option<watch::Receiver<bool>>,
) -> Option<F::Output> {
    let Some(rx) = shutdown.as_mut() else {
        return Some(fut.await);
    };
    if *rx.borrow() {
        return None;
    }

    tokio::pin!(fut);
    loop {
        let changed = tokio::select! {
            out = &mut fut => return Some(out),
            changed = rx.changed() => changed,
        };

        match changed {
            Ok(()) if *rx.borrow() => return None,
            Ok(()) => {}
            Err(_) => return Some(fut.await),
        }
    }
}
