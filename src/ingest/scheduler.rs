//! Round scheduler - main ingestion loop
//!
//! The scheduler alternates between two states:
//! - Polling round: every subscription is fetched (with retry), deduplicated
//!   against its seen-set, and its novel items are delivered. Once all feeds
//!   were attempted the state is pruned of unsubscribed feeds and persisted.
//! - Idle: sleeps for the round delay, then starts the next round.
//!
//! Feeds are independent: a feed that exhausts its retries only produces a
//! report to the error chat. Delivery and persistence failures are fatal.

use crate::config::{Config, Subscription};
use crate::delivery::{ChatId, DeliverySink};
use crate::ingest::retry::try_fetch;
use crate::ingest::{FeedSource, FetchError, RetryPolicy};
use crate::state::{mark_and_filter_new, IngestionState};
use crate::storage::SnapshotStore;
use crate::CourierError;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Timing and routing parameters of the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub retry: RetryPolicy,
    pub fetch_timeout: Duration,
    pub round_delay: Duration,
    pub error_chat: ChatId,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::new(
                config.ingest.max_retries,
                config.ingest.pacing_delay(),
                config.ingest.backoff_step(),
            ),
            fetch_timeout: config.ingest.fetch_timeout(),
            round_delay: config.ingest.round_delay(),
            error_chat: config.delivery.error_chat,
        }
    }
}

/// Outcome of one polling round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Feeds fetched successfully
    pub feeds_fetched: usize,

    /// Feeds that exhausted their retries
    pub feeds_failed: usize,

    /// Novel items delivered
    pub items_delivered: usize,

    /// Feeds dropped from the state because they are no longer subscribed
    pub pruned: Vec<String>,

    /// Whether a shutdown request cut the round short
    pub interrupted: bool,
}

/// Drives polling rounds over a fixed subscription list
pub struct Scheduler {
    settings: SchedulerSettings,
    subscriptions: Vec<Subscription>,
    source: Box<dyn FeedSource>,
    sink: Box<dyn DeliverySink>,
    store: Box<dyn SnapshotStore>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// `subscriptions` are processed in the given order; [`Config::subscriptions`]
    /// already sorts them by URL.
    pub fn new(
        settings: SchedulerSettings,
        subscriptions: Vec<Subscription>,
        source: Box<dyn FeedSource>,
        sink: Box<dyn DeliverySink>,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        Self {
            settings,
            subscriptions,
            source,
            sink,
            store,
            shutdown: None,
        }
    }

    /// Stops at the next feed boundary once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Loads the persisted state; a missing or unreadable snapshot is an error
    pub fn load_state(&self) -> Result<IngestionState, CourierError> {
        Ok(self.store.load()?)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().map_or(false, |rx| *rx.borrow())
    }

    /// Runs one polling round and returns the updated state
    ///
    /// The state is pruned and persisted before returning, also when the
    /// round was cut short by a shutdown request.
    pub async fn run_round(
        &mut self,
        mut state: IngestionState,
    ) -> Result<(IngestionState, RoundReport), CourierError> {
        let mut report = RoundReport::default();
        let started = Instant::now();
        tracing::info!("New round over {} feeds", self.subscriptions.len());

        for subscription in &self.subscriptions {
            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, skipping the rest of the round");
                report.interrupted = true;
                break;
            }

            let url = subscription.url.as_str();
            match try_fetch(
                self.source.as_ref(),
                url,
                &self.settings.retry,
                self.settings.fetch_timeout,
                self.shutdown.clone(),
            )
            .await
            {
                Ok(items) => {
                    let prior = state.take(url);
                    let (novel, seen) = mark_and_filter_new(items, prior);

                    for item in &novel {
                        tracing::info!("New item: title={:?} link={}", item.title, item.link);
                        self.sink
                            .deliver(&item.caption(), subscription.destination)
                            .await?;
                    }

                    tracing::info!("{} {}", url, seen.len());
                    report.items_delivered += novel.len();
                    report.feeds_fetched += 1;
                    state.insert(url, seen);
                }
                Err(FetchError::Interrupted { .. }) => {
                    tracing::info!(
                        "Shutdown requested while fetching {}, skipping the rest of the round",
                        url
                    );
                    report.interrupted = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("{} {}", url, e);
                    self.sink
                        .deliver(&format!("{} {}", url, e), self.settings.error_chat)
                        .await?;
                    report.feeds_failed += 1;
                }
            }
        }

        report.pruned = state.prune(self.subscriptions.iter().map(|s| s.url.as_str()));
        for url in &report.pruned {
            tracing::info!("Dropped history of unsubscribed feed {}", url);
        }

        self.store.save(&state)?;
        tracing::info!(
            "Round finished in {:?}: {} fetched, {} failed, {} delivered, {} feeds persisted",
            started.elapsed(),
            report.feeds_fetched,
            report.feeds_failed,
            report.items_delivered,
            state.len()
        );

        Ok((state, report))
    }

    /// Runs rounds until a shutdown is requested or a fatal error occurs
    pub async fn run(&mut self, mut state: IngestionState) -> Result<IngestionState, CourierError> {
        loop {
            let (next, report) = self.run_round(state).await?;
            state = next;

            if report.interrupted || self.shutdown_requested() {
                return Ok(state);
            }

            tracing::debug!("Sleeping {:?} until the next round", self.settings.round_delay);
            if self.idle().await {
                return Ok(state);
            }
        }
    }

    /// Sleeps for the round delay; returns true if woken by a shutdown request
    async fn idle(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.settings.round_delay);
        tokio::pin!(sleep);

        loop {
            let Some(rx) = self.shutdown.as_mut() else {
                sleep.await;
                return false;
            };

            let sender_alive = tokio::select! {
                _ = &mut sleep => return false,
                changed = rx.changed() => changed.is_ok(),
            };

            if sender_alive {
                if *rx.borrow() {
                    return true;
                }
            } else {
                // Nobody can request a shutdown anymore
                self.shutdown = None;
            }
        }
    }
}
