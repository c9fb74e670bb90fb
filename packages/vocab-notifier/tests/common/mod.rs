#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use tempfile::TempDir;

use vocab_notifier::config::WebhookConfig;
use vocab_notifier::db::{DbConfig, SqliteWordStore};
use vocab_notifier::services::DiscordWebhook;

pub struct TestStore {
    pub store: SqliteWordStore,
    _dir: TempDir,
}

pub async fn create_test_store() -> TestStore {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = DbConfig::sqlite_file(dir.path().join("words.db"));
    let store = SqliteWordStore::connect(&config)
        .await
        .expect("failed to open sqlite store");
    TestStore { store, _dir: dir }
}

/// Inserts an unused word. `seq` controls selection order.
pub async fn insert_word(
    store: &SqliteWordStore,
    seq: u32,
    id: &str,
    term: &str,
    meaning: &str,
    examples: &[&str],
) {
    let examples: Vec<serde_json::Value> = examples
        .iter()
        .map(|en| serde_json::json!({ "en": en }))
        .collect();
    let created_at = format!("2024-01-01 00:{:02}:{:02}", seq / 60, seq % 60);

    sqlx::query(
        r#"
        INSERT INTO "words" ("id", "term", "meaningVi", "examples", "createdAt")
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(term)
    .bind(meaning)
    .bind(serde_json::Value::Array(examples).to_string())
    .bind(created_at)
    .execute(store.pool())
    .await
    .expect("failed to insert word");
}

/// Inserts `count` words that were already sent on an earlier day.
pub async fn insert_used_words(store: &SqliteWordStore, count: u32) {
    for i in 0..count {
        sqlx::query(
            r#"
            INSERT INTO "words" ("id", "term", "meaningVi", "lastUsed")
            VALUES (?, ?, 'cũ', '2023-12-31T08:00:00+00:00')
            "#,
        )
        .bind(format!("used-{i}"))
        .bind(format!("old{i}"))
        .execute(store.pool())
        .await
        .expect("failed to insert used word");
    }
}

pub async fn last_used_of(store: &SqliteWordStore, id: &str) -> Option<String> {
    sqlx::query_scalar(r#"SELECT "lastUsed" FROM "words" WHERE "id" = ?"#)
        .bind(id)
        .fetch_one(store.pool())
        .await
        .expect("failed to read lastUsed")
}

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct ReceiverState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// Local stand-in for the webhook endpoint.
pub struct WebhookReceiver {
    pub url: reqwest::Url,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl WebhookReceiver {
    pub async fn start(status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ReceiverState {
            status,
            requests: Arc::clone(&requests),
        };
        let app = Router::new()
            .route("/hook", post(receive))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind webhook receiver");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: reqwest::Url::parse(&format!("http://{addr}/hook")).expect("bad url"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().expect("poisoned").clone()
    }
}

async fn receive(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .expect("poisoned")
        .push(ReceivedRequest { content_type, body });
    state.status
}

/// An address nothing is listening on.
pub fn unreachable_url() -> reqwest::Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    reqwest::Url::parse(&format!("http://{addr}/hook")).expect("bad url")
}

/// Webhook client that talks to local receivers directly, ignoring proxy env vars.
pub fn local_webhook(config: WebhookConfig) -> DiscordWebhook {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build client");
    DiscordWebhook::with_client(config, client)
}
