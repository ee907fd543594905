//! Feed fetcher implementation
//!
//! This module handles all HTTP requests for the ingestion loop:
//! - Building the HTTP client with the configured user agent
//! - Bounding one fetch (request, body and parse) by a single timeout
//! - Classifying failures into [`FetchError`] variants
//! - Keeping whatever items a non-success response still carried

use crate::config::UserAgentConfig;
use crate::ingest::parser::parse_feed;
use crate::ingest::{FeedItem, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A collaborator that turns a feed URL into an ordered list of items
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches and parses one feed
    ///
    /// The whole operation must complete within `timeout`, otherwise
    /// [`FetchError::Timeout`] is returned.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<FeedItem>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use feed_courier::config::UserAgentConfig;
/// use feed_courier::ingest::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`FeedSource`] backed by reqwest and feed-rs
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_unbounded(&self, url: &str) -> Result<Vec<FeedItem>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source: source.without_url(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            // Some servers send a valid feed along with an error status
            let recovered = parse_feed(&body).unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                recovered,
            });
        }

        parse_feed(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<FeedItem>, FetchError> {
        tracing::debug!("Fetching feed {}", url);
        match tokio::time::timeout(timeout, self.fetch_unbounded(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }
}
