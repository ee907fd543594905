use crate::delivery::ChatId;
use serde::Deserialize;
use std::time::Duration;

/// Round delay used when `round-delay-secs` is absent or zero
pub const DEFAULT_ROUND_DELAY_SECS: u64 = 120;

/// Fetch timeout used when `fetch-timeout-mins` is absent or zero
pub const DEFAULT_FETCH_TIMEOUT_MINS: u64 = 10;

/// Main configuration structure for Feed-Courier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    pub delivery: DeliveryConfig,
    pub storage: StorageConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub feeds: Vec<FeedGroup>,
}

/// Polling and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Idle time between two rounds (seconds, 0 means default)
    #[serde(rename = "round-delay-secs", default)]
    pub round_delay_secs: u64,

    /// Pause before every fetch attempt (seconds). Falls back to the round delay.
    #[serde(rename = "pacing-delay-secs", default)]
    pub pacing_delay_secs: Option<u64>,

    /// Upper bound for one fetch, network and parse included (minutes, 0 means default)
    #[serde(rename = "fetch-timeout-mins", default)]
    pub fetch_timeout_mins: u64,

    /// Retries after the first failed attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff increment per failed attempt (seconds)
    #[serde(rename = "backoff-step-secs", default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,
}

/// Drop-directory delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Directory watched by the external delivery agent
    #[serde(rename = "drop-dir")]
    pub drop_dir: String,

    /// Destination for feed failure reports
    #[serde(rename = "error-chat")]
    pub error_chat: ChatId,

    /// Filename prefix of staged messages
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(rename = "max-write-attempts", default = "default_max_write_attempts")]
    pub max_write_attempts: u32,

    #[serde(rename = "write-retry-delay-ms", default = "default_write_retry_delay_ms")]
    pub write_retry_delay_ms: u64,
}

/// Snapshot location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite snapshot file
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,
}

/// User agent identification sent with feed requests
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    #[serde(default = "default_agent_version")]
    pub version: String,

    /// URL with information about the bot
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

/// A group of feed URLs that share one destination
#[derive(Debug, Clone, Deserialize)]
pub struct FeedGroup {
    pub chat: ChatId,
    pub urls: Vec<String>,
}

/// One feed URL and the chat its new items go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub url: String,
    pub destination: ChatId,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            round_delay_secs: 0,
            pacing_delay_secs: None,
            fetch_timeout_mins: 0,
            max_retries: default_max_retries(),
            backoff_step_secs: default_backoff_step_secs(),
        }
    }
}

impl IngestConfig {
    /// Idle time between rounds, with the zero-means-default rule applied
    pub fn round_delay(&self) -> Duration {
        match self.round_delay_secs {
            0 => Duration::from_secs(DEFAULT_ROUND_DELAY_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn pacing_delay(&self) -> Duration {
        self.pacing_delay_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.round_delay())
    }

    pub fn fetch_timeout(&self) -> Duration {
        let mins = match self.fetch_timeout_mins {
            0 => DEFAULT_FETCH_TIMEOUT_MINS,
            mins => mins,
        };
        Duration::from_secs(mins * 60)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_secs(self.backoff_step_secs)
    }
}

impl DeliveryConfig {
    pub fn write_retry_delay(&self) -> Duration {
        Duration::from_millis(self.write_retry_delay_ms)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.name, self.version, url),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

impl Config {
    /// Flattens the feed groups into one subscription per URL, sorted by URL
    ///
    /// Assumes the configuration passed validation; a URL repeated under the
    /// same chat is kept once.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        let mut subscriptions: Vec<Subscription> = self
            .feeds
            .iter()
            .flat_map(|group| {
                group.urls.iter().map(move |url| Subscription {
                    url: url.clone(),
                    destination: group.chat,
                })
            })
            .collect();

        subscriptions.sort_by(|a, b| a.url.cmp(&b.url));
        subscriptions.dedup_by(|a, b| a.url == b.url);
        subscriptions
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_step_secs() -> u64 {
    1
}

fn default_file_prefix() -> String {
    "rss_".to_string()
}

fn default_max_write_attempts() -> u32 {
    99
}

fn default_write_retry_delay_ms() -> u64 {
    1000
}

fn default_agent_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
