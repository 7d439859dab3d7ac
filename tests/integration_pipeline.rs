use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use leadhub::app::build_state;
use leadhub::config::Config;
use leadhub::db::{self, queries};
use leadhub::mailsource::{MailSource, MailSourceError, RawMessage};
use leadhub::models::Account;
use leadhub::routes;
use leadhub::services::pipeline;

// Stub classifier gateway

#[derive(Clone)]
enum ClassifierMode {
    /// Label derived from the email body, like the real gateway would.
    ByContent,
    /// Always reply with this label.
    Fixed(&'static str),
    /// Always fail with a 500.
    Fail,
}

fn completion(label: &str) -> Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": label } }
        ]
    })
}

async fn classifier_handler(
    State(mode): State<ClassifierMode>,
    Json(req): Json<Value>,
) -> axum::response::Response {
    match mode {
        ClassifierMode::Fail => {
            (StatusCode::INTERNAL_SERVER_ERROR, "gateway exploded").into_response()
        }
        ClassifierMode::Fixed(label) => Json(completion(label)).into_response(),
        ClassifierMode::ByContent => {
            let content = req["messages"][1]["content"].as_str().unwrap_or("");
            let label = if content.contains("I'm interested") {
                "interested"
            } else if content.contains("not looking") {
                "not_interested"
            } else {
                "uncategorized"
            };
            Json(completion(label)).into_response()
        }
    }
}

// Stub sinks

#[derive(Clone)]
struct SinkStub {
    chat_fail: bool,
    captured: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn chat_sink(State(stub): State<SinkStub>, Json(payload): Json<Value>) -> axum::response::Response {
    stub.captured.lock().await.push(("chat".into(), payload));
    if stub.chat_fail {
        (StatusCode::INTERNAL_SERVER_ERROR, "chat webhook down").into_response()
    } else {
        "ok".into_response()
    }
}

async fn generic_sink(State(stub): State<SinkStub>, Json(payload): Json<Value>) -> axum::response::Response {
    stub.captured.lock().await.push(("hook".into(), payload));
    "ok".into_response()
}

// Fixed-candidate mail source so re-runs see the same message identifiers

struct FixedMailSource(Vec<RawMessage>);

#[async_trait]
impl MailSource for FixedMailSource {
    async fn fetch_candidates(
        &self,
        _account: &Account,
    ) -> Result<Vec<RawMessage>, MailSourceError> {
        Ok(self.0.clone())
    }
}

fn raw(message_id: &str, from: &str, subject: &str, body: &str) -> RawMessage {
    RawMessage {
        message_id: message_id.to_string(),
        from_addr: from.to_string(),
        to_addr: "acct-1@example.test".to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        folder: "INBOX".to_string(),
        received_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn scenario_candidates() -> Vec<RawMessage> {
    vec![
        raw(
            "msg-001",
            "alice@example.test",
            "Re: Job Application - Software Engineer Position",
            "Thank you for applying. We'd love to discuss the position further.",
        ),
        raw(
            "msg-002",
            "bob@example.test",
            "Great to connect! Let's schedule a call",
            "I'm interested in learning more about your product. When can we meet?",
        ),
        raw(
            "msg-003",
            "carol@example.test",
            "Not interested at this time",
            "Thank you for reaching out, but we're not looking for this right now.",
        ),
    ]
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

struct TestApp {
    base: String,
    pool: SqlitePool,
    captured: Arc<Mutex<Vec<(String, Value)>>>,
    client: reqwest::Client,
}

async fn start_app(
    mode: ClassifierMode,
    chat_fail: bool,
    candidates: Vec<RawMessage>,
) -> TestApp {
    // Single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect memory sqlite");
    db::run_migrations(&pool).await.expect("migrate");

    let classifier_base = spawn_server(
        Router::new()
            .route("/v1/chat/completions", post(classifier_handler))
            .with_state(mode),
    )
    .await;

    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = SinkStub {
        chat_fail,
        captured: captured.clone(),
    };
    let sink_base = spawn_server(
        Router::new()
            .route("/chat", post(chat_sink))
            .route("/hook", post(generic_sink))
            .with_state(stub),
    )
    .await;

    let config = Config {
        database_url: "sqlite::memory:".into(),
        port: 0,
        classifier_url: format!("{}/v1/chat/completions", classifier_base),
        classifier_api_key: "test-key".into(),
        classifier_model: "test-model".into(),
        chat_webhook_url: format!("{}/chat", sink_base),
        webhook_url: format!("{}/hook", sink_base),
        http_timeout_secs: 5,
    };

    let (state, jobs) = build_state(config, pool.clone(), Arc::new(FixedMailSource(candidates)))
        .expect("build state");
    pipeline::run(state.clone(), jobs);

    let base = spawn_server(routes::routes(state)).await;

    TestApp {
        base,
        pool,
        captured,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    async fn add_account(&self, email: &str) -> Value {
        let res = self
            .client
            .post(format!("{}/accounts", self.base))
            .json(&json!({ "email": email, "userId": "user-1" }))
            .send()
            .await
            .unwrap();
        assert!(res.status().is_success());
        res.json().await.unwrap()
    }

    async fn sync(&self, email: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .post(format!("{}/sync", self.base))
            .json(&json!({ "accountEmail": email }))
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
        (status, res.json().await.unwrap())
    }

    async fn message_category(&self, message_id: &str) -> Option<String> {
        queries::get_message_by_message_id(&self.pool, message_id)
            .await
            .unwrap()
            .map(|m| m.category)
    }

    /// Poll until every listed message carries the expected label.
    async fn wait_for_labels(&self, expected: &[(&str, &str)]) -> bool {
        wait_for(|| {
            let pool = self.pool.clone();
            let expected: Vec<(String, String)> = expected
                .iter()
                .map(|(m, c)| (m.to_string(), c.to_string()))
                .collect();
            async move {
                for (message_id, category) in &expected {
                    let found = queries::get_message_by_message_id(&pool, message_id)
                        .await
                        .unwrap()
                        .map(|m| m.category);
                    if found.as_deref() != Some(category.as_str()) {
                        return false;
                    }
                }
                true
            }
        })
        .await
    }

    /// Poll until the message has at least `count` audit records.
    async fn wait_for_audit(&self, email_id: i64, count: usize) -> bool {
        wait_for(|| {
            let pool = self.pool.clone();
            async move {
                queries::list_notifications(&pool, email_id)
                    .await
                    .unwrap()
                    .len()
                    >= count
            }
        })
        .await
    }
}

/// Poll a condition until it holds or a few seconds pass.
async fn wait_for<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn ingest_classifies_and_notifies_the_interested_lead() {
    let app = start_app(ClassifierMode::ByContent, false, scenario_candidates()).await;
    app.add_account("acct-1@example.test").await;

    let (status, body) = app.sync("acct-1@example.test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);

    // Classification fans out asynchronously; wait for all three labels
    let settled = app
        .wait_for_labels(&[
            ("msg-001", "uncategorized"),
            ("msg-002", "interested"),
            ("msg-003", "not_interested"),
        ])
        .await;
    assert!(settled, "labels never settled");

    // Only the interested message is notified, and both sinks are audited
    let interested = queries::get_message_by_message_id(&app.pool, "msg-002")
        .await
        .unwrap()
        .unwrap();
    let audited = app.wait_for_audit(interested.id, 2).await;
    assert!(audited, "expected two audit records");

    let records = queries::list_notifications(&app.pool, interested.id)
        .await
        .unwrap();
    assert!(records.iter().all(|r| r.status == "sent"));
    assert!(records.iter().any(|r| r.webhook_url.ends_with("/chat")));
    assert!(records.iter().any(|r| r.webhook_url.ends_with("/hook")));

    let captured = app.captured.lock().await;
    let generic = captured
        .iter()
        .find(|(sink, _)| sink == "hook")
        .map(|(_, payload)| payload.clone())
        .expect("generic webhook payload");
    assert_eq!(generic["event"], "email.interested");
    assert_eq!(generic["email"]["category"], "interested");
    assert_eq!(
        generic["email"]["subject"],
        "Great to connect! Let's schedule a call"
    );

    // The other messages produced no audit rows
    for message_id in ["msg-001", "msg-003"] {
        let message = queries::get_message_by_message_id(&app.pool, message_id)
            .await
            .unwrap()
            .unwrap();
        assert!(queries::list_notifications(&app.pool, message.id)
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn reingesting_the_same_batch_never_duplicates_messages() {
    let app = start_app(ClassifierMode::Fixed("uncategorized"), false, scenario_candidates()).await;
    app.add_account("acct-1@example.test").await;

    let (_, first) = app.sync("acct-1@example.test").await;
    let (_, second) = app.sync("acct-1@example.test").await;
    assert_eq!(first["count"], 3);
    assert_eq!(second["count"], 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 3);

    // Re-ingestion stamped the account's last-sync time
    let account = queries::get_account_by_email(&app.pool, "acct-1@example.test")
        .await
        .unwrap()
        .unwrap();
    assert!(account.last_sync_at.is_some());
}

#[tokio::test]
async fn classification_is_idempotent_for_a_stable_label() {
    let app = start_app(
        ClassifierMode::Fixed("meeting_booked"),
        false,
        vec![raw("msg-010", "dan@example.test", "Re: call", "See you Tuesday.")],
    )
    .await;
    app.add_account("acct-1@example.test").await;
    app.sync("acct-1@example.test").await;

    for _ in 0..2 {
        let res = app
            .client
            .post(format!("{}/classify", app.base))
            .json(&json!({ "emailId": "msg-010" }))
            .send()
            .await
            .unwrap();
        assert!(res.status().is_success());
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["category"], "meeting_booked");
    }

    assert_eq!(
        app.message_category("msg-010").await.as_deref(),
        Some("meeting_booked")
    );
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn out_of_taxonomy_labels_are_coerced_never_persisted() {
    let app = start_app(
        ClassifierMode::Fixed("urgent"),
        false,
        vec![raw("msg-020", "eve@example.test", "act now", "URGENT business proposal")],
    )
    .await;
    app.add_account("acct-1@example.test").await;
    app.sync("acct-1@example.test").await;

    let res = app
        .client
        .post(format!("{}/classify", app.base))
        .json(&json!({ "emailId": "msg-020" }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["category"], "uncategorized");

    assert_eq!(
        app.message_category("msg-020").await.as_deref(),
        Some("uncategorized")
    );
}

#[tokio::test]
async fn classifier_failure_is_surfaced_and_leaves_the_label_unchanged() {
    let app = start_app(
        ClassifierMode::Fail,
        false,
        vec![raw("msg-030", "fay@example.test", "hello", "hello there")],
    )
    .await;
    app.add_account("acct-1@example.test").await;
    app.sync("acct-1@example.test").await;

    let res = app
        .client
        .post(format!("{}/classify", app.base))
        .json(&json!({ "emailId": "msg-030" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Classification failed"));

    assert_eq!(
        app.message_category("msg-030").await.as_deref(),
        Some("uncategorized")
    );
}

#[tokio::test]
async fn one_failing_sink_does_not_suppress_the_other() {
    let app = start_app(
        ClassifierMode::Fixed("interested"),
        true, // chat webhook down
        vec![raw(
            "msg-040",
            "gil@example.test",
            "Great to connect! Let's schedule a call",
            "I'm interested...",
        )],
    )
    .await;
    app.add_account("acct-1@example.test").await;
    app.sync("acct-1@example.test").await;

    let found = wait_for(|| {
        let pool = app.pool.clone();
        async move {
            queries::get_message_by_message_id(&pool, "msg-040")
                .await
                .unwrap()
                .is_some()
        }
    })
    .await;
    assert!(found);
    let message = queries::get_message_by_message_id(&app.pool, "msg-040")
        .await
        .unwrap()
        .unwrap();

    let audited = app.wait_for_audit(message.id, 2).await;
    assert!(audited, "expected audit records for both sinks");

    let records = queries::list_notifications(&app.pool, message.id)
        .await
        .unwrap();
    let chat = records
        .iter()
        .find(|r| r.webhook_url.ends_with("/chat"))
        .unwrap();
    let hook = records
        .iter()
        .find(|r| r.webhook_url.ends_with("/hook"))
        .unwrap();
    assert_eq!(chat.status, "failed");
    assert_eq!(hook.status, "sent");

    // Driving the stage directly still reports overall success
    let res = app
        .client
        .post(format!("{}/notify", app.base))
        .json(&json!({ "emailId": message.id.to_string() }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn non_interested_labels_never_trigger_notification() {
    let app = start_app(
        ClassifierMode::Fixed("spam"),
        false,
        vec![raw("msg-050", "spam@example.test", "offer", "Click here!!!")],
    )
    .await;
    app.add_account("acct-1@example.test").await;
    app.sync("acct-1@example.test").await;

    let classified = app.wait_for_labels(&[("msg-050", "spam")]).await;
    assert!(classified);

    // Give a would-be notification job time to run, then confirm silence
    tokio::time::sleep(Duration::from_millis(300)).await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM webhook_notifications")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert!(app.captured.lock().await.is_empty());
}

#[tokio::test]
async fn unknown_account_and_message_are_not_found() {
    let app = start_app(ClassifierMode::Fixed("interested"), false, vec![]).await;

    let (status, body) = app.sync("ghost@example.test").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Account not found"));

    let res = app
        .client
        .post(format!("{}/classify", app.base))
        .json(&json!({ "emailId": "no-such-message" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    for email_id in ["999", "not-a-number"] {
        let res = app
            .client
            .post(format!("{}/notify", app.base))
            .json(&json!({ "emailId": email_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 404);
    }
}

#[tokio::test]
async fn preflight_requests_get_permissive_cors() {
    let app = start_app(ClassifierMode::Fixed("interested"), false, vec![]).await;

    let res = app
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/sync", app.base))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert!(res.headers().contains_key("access-control-allow-origin"));
}
