//! End-to-end cycle tests against mock feeds and a mock webhook endpoint.
//!
//! These drive `Watcher::run_cycle` the way the poller does, with real HTTP
//! on the wire, and pin down the delivery guarantees: at most one send per
//! distinct payload, retry-by-omission on failed sends, and restart safety
//! through the durable ledger.

use std::sync::Arc;

use async_trait::async_trait;
use feedring::error::{AppError, Result};
use feedring::ledger::{DedupLedger, MemoryLedger, SqliteLedger};
use feedring::models::{Config, EntityConfig, RedirectFeedConfig, StatusFeedConfig};
use feedring::pipeline::{LastSeen, Watcher};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn base_config(server: &MockServer) -> Config {
    Config {
        webhook_url: format!("{}/hook", server.uri()),
        status_feed: Some(StatusFeedConfig {
            url: format!("{}/status", server.uri()),
            link_base: "https://posts.example".to_string(),
        }),
        entities: vec![EntityConfig {
            id: "alpha".to_string(),
            name: "Alpha Live".to_string(),
            color: 0xFF6B6B,
            avatar: "https://cdn.example/alpha.png".to_string(),
        }],
        ..Config::default()
    }
}

fn status_body(status: &str, detail: &[&str], date: &str) -> String {
    serde_json::json!({
        "entities": {
            "alpha": {
                "status": status,
                "detail": detail,
                "idx": 42,
                "date": date,
            }
        }
    })
    .to_string()
}

async fn mount_status(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(server)
        .await;
}

async fn mount_status_once(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_hook_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

async fn hook_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/hook")
        .collect()
}

#[tokio::test]
async fn idempotence_same_payload_sends_once() {
    let server = MockServer::start().await;
    mount_status(&server, status_body("LIVE", &["x"], "2024-01-01")).await;
    mount_hook_ok(&server).await;

    let watcher = Watcher::new(
        Arc::new(base_config(&server)),
        Arc::new(MemoryLedger::new()),
    )
    .unwrap();

    let mut last_seen = LastSeen::new();
    let first = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(first.sent, 1);

    for _ in 0..4 {
        let outcome = watcher.run_cycle(&mut last_seen).await;
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.unchanged, 1);
    }

    assert_eq!(hook_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn change_in_detail_text_produces_fresh_send() {
    let server = MockServer::start().await;
    mount_status_once(&server, status_body("LIVE", &["x"], "2024-01-01")).await;
    mount_status(&server, status_body("LIVE", &["x v2"], "2024-01-01")).await;
    mount_hook_ok(&server).await;

    let watcher = Watcher::new(
        Arc::new(base_config(&server)),
        Arc::new(MemoryLedger::new()),
    )
    .unwrap();

    let mut last_seen = LastSeen::new();
    assert_eq!(watcher.run_cycle(&mut last_seen).await.sent, 1);
    assert_eq!(watcher.run_cycle(&mut last_seen).await.sent, 1);

    assert_eq!(hook_requests(&server).await.len(), 2);
}

#[tokio::test]
async fn empty_status_never_sends() {
    let server = MockServer::start().await;
    mount_status(&server, status_body("", &["details present"], "2024-01-01")).await;
    mount_hook_ok(&server).await;

    let watcher = Watcher::new(
        Arc::new(base_config(&server)),
        Arc::new(MemoryLedger::new()),
    )
    .unwrap();

    let mut last_seen = LastSeen::new();
    let outcome = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.suppressed, 1);
    assert!(hook_requests(&server).await.is_empty());
}

#[tokio::test]
async fn failed_delivery_is_retried_next_cycle() {
    let server = MockServer::start().await;
    mount_status(&server, status_body("LIVE", &["x"], "2024-01-01")).await;

    // First delivery attempt fails, the next one succeeds.
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_hook_ok(&server).await;

    let ledger = Arc::new(MemoryLedger::new());
    let watcher = Watcher::new(Arc::new(base_config(&server)), ledger.clone()).unwrap();

    let mut last_seen = LastSeen::new();
    let first = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(first.sent, 0);
    assert_eq!(first.failures, 1);
    // No ledger entry was created for the failed send.
    assert_eq!(ledger.len().await.unwrap(), 0);

    let second = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(second.sent, 1);
    assert_eq!(ledger.len().await.unwrap(), 1);

    assert_eq!(hook_requests(&server).await.len(), 2);
}

#[tokio::test]
async fn restart_with_populated_ledger_does_not_resend() {
    let server = MockServer::start().await;
    mount_status(&server, status_body("LIVE", &["x"], "2024-01-01")).await;
    mount_hook_ok(&server).await;

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ledger.db");

    // First process lifetime: deliver once.
    {
        let ledger = Arc::new(SqliteLedger::open(&db_path).unwrap());
        let watcher = Watcher::new(Arc::new(base_config(&server)), ledger).unwrap();
        let mut last_seen = LastSeen::new();
        assert_eq!(watcher.run_cycle(&mut last_seen).await.sent, 1);
    }

    // Restart: last-seen cleared, ledger reloaded from disk.
    let ledger = Arc::new(SqliteLedger::open(&db_path).unwrap());
    let watcher = Watcher::new(Arc::new(base_config(&server)), ledger).unwrap();
    let mut last_seen = LastSeen::new();

    let outcome = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.duplicates, 1);

    assert_eq!(hook_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn three_cycle_scenario() {
    let server = MockServer::start().await;
    mount_hook_ok(&server).await;

    // Cycle 1 and 2 see the same record; cycle 3 sees changed detail text.
    mount_status_once(&server, status_body("LIVE", &["x"], "2024-01-01")).await;
    mount_status_once(&server, status_body("LIVE", &["x"], "2024-01-01")).await;
    mount_status(&server, status_body("LIVE", &["x v2"], "2024-01-01")).await;

    let ledger = Arc::new(MemoryLedger::new());
    let watcher = Watcher::new(Arc::new(base_config(&server)), ledger.clone()).unwrap();

    // Fresh last-seen per cycle so dedup rests on the ledger alone.
    let first = watcher.run_cycle(&mut LastSeen::new()).await;
    assert_eq!(first.sent, 1);

    let second = watcher.run_cycle(&mut LastSeen::new()).await;
    assert_eq!(second.sent, 0);
    assert_eq!(second.duplicates, 1);

    let third = watcher.run_cycle(&mut LastSeen::new()).await;
    assert_eq!(third.sent, 1);

    assert_eq!(ledger.len().await.unwrap(), 2);
    assert_eq!(hook_requests(&server).await.len(), 2);
}

#[tokio::test]
async fn redirect_item_delivered_once_with_attachment() {
    let server = MockServer::start().await;
    mount_hook_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/items/a.png", server.uri()).as_str())
                .insert_header("Index", "777"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]))
        .mount(&server)
        .await;

    let config = Config {
        webhook_url: format!("{}/hook", server.uri()),
        redirect_feed: Some(RedirectFeedConfig {
            url: format!("{}/latest", server.uri()),
            link_base: "https://posts.example".to_string(),
            name: "Journal".to_string(),
            avatar: "https://cdn.example/journal.png".to_string(),
        }),
        ..Config::default()
    };

    let watcher = Watcher::new(Arc::new(config), Arc::new(MemoryLedger::new())).unwrap();

    let mut last_seen = LastSeen::new();
    let first = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(first.sent, 1);

    let second = watcher.run_cycle(&mut last_seen).await;
    assert_eq!(second.sent, 0);
    assert_eq!(second.unchanged, 1);

    let hooks = hook_requests(&server).await;
    assert_eq!(hooks.len(), 1);

    // Multipart body carries both the JSON payload and the image part.
    let body = String::from_utf8_lossy(&hooks[0].body).to_string();
    assert!(body.contains("payload_json"));
    assert!(body.contains("image.png"));
    assert!(body.contains("https://posts.example/777"));
}

#[tokio::test]
async fn asset_failure_does_not_block_status_source() {
    let server = MockServer::start().await;
    mount_hook_ok(&server).await;
    mount_status(&server, status_body("LIVE", &["x"], "2024-01-01")).await;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/items/gone.png", server.uri()).as_str())
                .insert_header("Index", "777"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut config = base_config(&server);
    config.redirect_feed = Some(RedirectFeedConfig {
        url: format!("{}/latest", server.uri()),
        link_base: "https://posts.example".to_string(),
        name: "Journal".to_string(),
        avatar: "https://cdn.example/journal.png".to_string(),
    });

    let watcher = Watcher::new(Arc::new(config), Arc::new(MemoryLedger::new())).unwrap();

    let mut last_seen = LastSeen::new();
    let outcome = watcher.run_cycle(&mut last_seen).await;

    // The redirect source aborted, but the status entity still went out.
    assert_eq!(outcome.source_failures, 1);
    assert_eq!(outcome.sent, 1);
    assert_eq!(hook_requests(&server).await.len(), 1);
}

/// Ledger backend whose checks always fail, for fail-closed verification.
struct BrokenLedger;

#[async_trait]
impl DedupLedger for BrokenLedger {
    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(AppError::ledger("ledger offline"))
    }

    async fn commit(&self, _key: &str) -> Result<()> {
        Err(AppError::ledger("ledger offline"))
    }

    async fn len(&self) -> Result<u64> {
        Err(AppError::ledger("ledger offline"))
    }
}

#[tokio::test]
async fn ledger_failure_fails_closed() {
    let server = MockServer::start().await;
    mount_hook_ok(&server).await;
    mount_status(&server, status_body("LIVE", &["x"], "2024-01-01")).await;

    let watcher = Watcher::new(Arc::new(base_config(&server)), Arc::new(BrokenLedger)).unwrap();

    let mut last_seen = LastSeen::new();
    let outcome = watcher.run_cycle(&mut last_seen).await;

    // No send may happen without a working idempotency check.
    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.failures, 1);
    assert!(hook_requests(&server).await.is_empty());
}
