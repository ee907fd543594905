//! HttpFeedSource against a mock server

use crate::common::rss;
use feed_courier::config::UserAgentConfig;
use feed_courier::ingest::{FeedSource, FetchError, HttpFeedSource};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source() -> HttpFeedSource {
    let agent = UserAgentConfig {
        name: "TestCourier".to_string(),
        version: "1.0.0".to_string(),
        contact_url: None,
    };
    HttpFeedSource::new(&agent).expect("Failed to build HTTP client")
}

#[tokio::test]
async fn test_fetches_and_parses_rss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .and(header("user-agent", "TestCourier/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
            ("guid-1", "https://example.com/1", "One"),
            ("", "https://example.com/2", "Two"),
        ])))
        .mount(&server)
        .await;

    let url = format!("{}/feed.xml", server.uri());
    let items = source()
        .fetch(&url, Duration::from_secs(5))
        .await
        .expect("Fetch should succeed");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].identifier(), "guid-1");
    assert_eq!(items[0].caption(), "One https://example.com/1");
    assert_eq!(items[1].identifier(), "https://example.com/2");
}

#[tokio::test]
async fn test_error_status_keeps_recovered_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string(rss(&[("guid-1", "https://example.com/1", "One")])),
        )
        .mount(&server)
        .await;

    let url = format!("{}/feed.xml", server.uri());
    let err = source()
        .fetch(&url, Duration::from_secs(5))
        .await
        .expect_err("A 503 must be reported");

    match &err {
        FetchError::Status { status, .. } => assert_eq!(*status, 503),
        other => panic!("expected status error, got {:?}", other),
    }
    assert_eq!(err.url(), url);
    assert_eq!(err.recovered_items().len(), 1);
    assert_eq!(err.to_string(), "HTTP status 503");
}

#[tokio::test]
async fn test_garbage_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not a feed"))
        .mount(&server)
        .await;

    let url = format!("{}/feed.xml", server.uri());
    let result = source().fetch(&url, Duration::from_secs(5)).await;

    assert!(matches!(result, Err(FetchError::Parse { .. })));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(&[]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/feed.xml", server.uri());
    let result = source().fetch(&url, Duration::from_millis(200)).await;

    match result {
        Err(FetchError::Timeout { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_millis(200))
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}
