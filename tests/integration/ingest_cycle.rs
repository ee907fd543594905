//! Full rounds: HTTP feed -> dedup -> drop directory -> snapshot

use crate::common::{rss, staged_messages};
use feed_courier::config::{Subscription, UserAgentConfig};
use feed_courier::ingest::{RetryPolicy, SchedulerSettings};
use feed_courier::storage::{init_snapshot, open_snapshot, StorageError};
use feed_courier::{DropDirSink, HttpFeedSource, IngestionState, Scheduler, SeenSet, SnapshotStore};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ERROR_CHAT: i64 = -100;

fn settings(max_retries: u32) -> SchedulerSettings {
    SchedulerSettings {
        retry: RetryPolicy::new(max_retries, Duration::ZERO, Duration::from_millis(10)),
        fetch_timeout: Duration::from_secs(5),
        round_delay: Duration::from_secs(120),
        error_chat: ERROR_CHAT,
    }
}

fn scheduler(
    subscriptions: Vec<Subscription>,
    drop_dir: &Path,
    snapshot: &Path,
    max_retries: u32,
) -> Scheduler {
    let source = HttpFeedSource::new(&UserAgentConfig::default()).expect("HTTP client");
    let sink = DropDirSink::new(drop_dir).with_retry(3, Duration::from_millis(10));
    let store = open_snapshot(snapshot).expect("Snapshot should open");

    Scheduler::new(
        settings(max_retries),
        subscriptions,
        Box::new(source),
        Box::new(sink),
        Box::new(store),
    )
}

async fn serve(server: &MockServer, route: &str, status: u16, body: String) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn seen(state: &IngestionState, url: &str) -> Vec<String> {
    state
        .get(url)
        .map(|s| s.iter().map(str::to_string).collect())
        .unwrap_or_default()
}

struct Workspace {
    _dir: TempDir,
    drop_dir: std::path::PathBuf,
    snapshot: std::path::PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let drop_dir = dir.path().join("outbox");
    std::fs::create_dir(&drop_dir).expect("Failed to create drop dir");
    let snapshot = dir.path().join("seen.db");
    init_snapshot(&snapshot).expect("Failed to create snapshot");

    Workspace {
        _dir: dir,
        drop_dir,
        snapshot,
    }
}

#[tokio::test]
async fn test_cold_start_then_incremental_delivery() {
    let server = MockServer::start().await;
    let ws = workspace();
    let url = format!("{}/f1.xml", server.uri());
    let subscriptions = vec![Subscription {
        url: url.clone(),
        destination: 42,
    }];

    serve(&server, "/f1.xml", 200, rss(&[("item-a1", "https://x/1", "One")])).await;
    let mut courier = scheduler(subscriptions.clone(), &ws.drop_dir, &ws.snapshot, 0);
    let state = courier.load_state().expect("load");
    let (state, report) = courier.run_round(state).await.expect("round 1");

    assert_eq!(report.items_delivered, 0);
    assert!(staged_messages(&ws.drop_dir).is_empty());
    assert_eq!(seen(&state, &url), vec!["item-a1"]);

    serve(
        &server,
        "/f1.xml",
        200,
        rss(&[("item-a1", "https://x/1", "One"), ("item-a2", "https://x/2", "Two")]),
    )
    .await;
    let (state, report) = courier.run_round(state).await.expect("round 2");

    assert_eq!(report.items_delivered, 1);
    let messages = staged_messages(&ws.drop_dir);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].caption, "Two https://x/2");
    assert_eq!(messages[0].chat_id, 42);
    assert_eq!(messages[0].method, "sendText");
    assert_eq!(seen(&state, &url), vec!["item-a1", "item-a2"]);
}

#[tokio::test]
async fn test_restart_does_not_redeliver() {
    let server = MockServer::start().await;
    let ws = workspace();
    let url = format!("{}/f1.xml", server.uri());
    let subscriptions = vec![Subscription {
        url: url.clone(),
        destination: 7,
    }];
    serve(
        &server,
        "/f1.xml",
        200,
        rss(&[("item-a1", "https://x/1", "One"), ("item-a2", "https://x/2", "Two")]),
    )
    .await;

    {
        let mut courier = scheduler(subscriptions.clone(), &ws.drop_dir, &ws.snapshot, 0);
        let state = courier.load_state().expect("load");
        courier.run_round(state).await.expect("first run");
    }

    let persisted = open_snapshot(&ws.snapshot)
        .expect("reopen")
        .load()
        .expect("load");
    assert_eq!(seen(&persisted, &url), vec!["item-a1", "item-a2"]);

    let mut courier = scheduler(subscriptions, &ws.drop_dir, &ws.snapshot, 0);
    let state = courier.load_state().expect("load");
    let (_, report) = courier.run_round(state).await.expect("second run");

    assert_eq!(report.items_delivered, 0);
    assert!(staged_messages(&ws.drop_dir).is_empty());
}

#[tokio::test]
async fn test_https_variant_of_seen_link_is_not_redelivered() {
    let server = MockServer::start().await;
    let ws = workspace();
    let url = format!("{}/f1.xml", server.uri());

    let mut state = IngestionState::new();
    state.insert(url.clone(), SeenSet::from(vec!["http://x/1".to_string()]));
    open_snapshot(&ws.snapshot)
        .expect("open")
        .save(&state)
        .expect("seed snapshot");

    serve(&server, "/f1.xml", 200, rss(&[("", "https://x/1", "One")])).await;
    let mut courier = scheduler(
        vec![Subscription {
            url: url.clone(),
            destination: 1,
        }],
        &ws.drop_dir,
        &ws.snapshot,
        0,
    );
    let state = courier.load_state().expect("load");
    let (state, report) = courier.run_round(state).await.expect("round");

    assert_eq!(report.items_delivered, 0);
    assert_eq!(seen(&state, &url), vec!["http://x/1"]);
}

#[tokio::test]
async fn test_failing_feed_is_reported_to_error_chat() {
    let server = MockServer::start().await;
    let ws = workspace();
    let url = format!("{}/broken.xml", server.uri());

    serve(&server, "/broken.xml", 500, "boom".to_string()).await;
    let mut courier = scheduler(
        vec![Subscription {
            url: url.clone(),
            destination: 5,
        }],
        &ws.drop_dir,
        &ws.snapshot,
        2,
    );
    let state = courier.load_state().expect("load");
    let (state, report) = courier.run_round(state).await.expect("round");

    assert_eq!(report.feeds_failed, 1);
    assert!(!state.contains_feed(&url));

    let messages = staged_messages(&ws.drop_dir);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].chat_id, ERROR_CHAT);
    assert_eq!(messages[0].caption, format!("{} HTTP status 500", url));

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_unsubscribed_feed_is_pruned_from_snapshot() {
    let server = MockServer::start().await;
    let ws = workspace();
    let url = format!("{}/f1.xml", server.uri());

    let mut state = IngestionState::new();
    state.insert("https://gone.example/feed", SeenSet::from(vec!["z".to_string()]));
    open_snapshot(&ws.snapshot)
        .expect("open")
        .save(&state)
        .expect("seed snapshot");

    serve(&server, "/f1.xml", 200, rss(&[("item-a1", "https://x/1", "One")])).await;
    let mut courier = scheduler(
        vec![Subscription {
            url: url.clone(),
            destination: 1,
        }],
        &ws.drop_dir,
        &ws.snapshot,
        0,
    );
    let state = courier.load_state().expect("load");
    let (_, report) = courier.run_round(state).await.expect("round");

    assert_eq!(report.pruned, vec!["https://gone.example/feed".to_string()]);
    let persisted = open_snapshot(&ws.snapshot)
        .expect("reopen")
        .load()
        .expect("load");
    assert!(!persisted.contains_feed("https://gone.example/feed"));
    assert_eq!(seen(&persisted, &url), vec!["item-a1"]);
}

#[test]
fn test_missing_snapshot_refuses_to_start() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let result = open_snapshot(&dir.path().join("absent.db"));

    assert!(matches!(result, Err(StorageError::NotFound(_))));
}
