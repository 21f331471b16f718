#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use support_console::{
    config::Config,
    database::pool::{create_pool, run_migrations},
    error::{Error, Result},
    models::user::{ProviderProfile, Role, User},
    routes,
    services::line_client::{LineApi, OutboundMessage},
    utils::line_signature::sign,
    AppState,
};

pub const CHANNEL_ID: &str = "C1";
pub const CHANNEL_SECRET: &str = "c1-secret";
pub const CHANNEL_TOKEN: &str = "token-c1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPush {
    pub access_token: String,
    pub to: String,
    pub messages: Vec<OutboundMessage>,
}

/// Provider stand-in that answers from canned profiles and records pushes.
#[derive(Default)]
pub struct RecordingLine {
    profiles: Mutex<HashMap<String, ProviderProfile>>,
    pushes: Mutex<Vec<RecordedPush>>,
    fail_pushes: Mutex<bool>,
}

impl RecordingLine {
    pub fn with_profile(self, user_id: &str, display_name: &str) -> Self {
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            ProviderProfile {
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                picture_url: None,
            },
        );
        self
    }

    pub fn failing_pushes(self) -> Self {
        *self.fail_pushes.lock().unwrap() = true;
        self
    }

    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl LineApi for RecordingLine {
    async fn get_profile(&self, _access_token: &str, user_id: &str) -> Result<ProviderProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::Provider("404 profile not found".into()))
    }

    async fn push_message(
        &self,
        access_token: &str,
        to: &str,
        messages: &[OutboundMessage],
    ) -> Result<()> {
        if *self.fail_pushes.lock().unwrap() {
            return Err(Error::Provider("500 upstream failure".into()));
        }
        self.pushes.lock().unwrap().push(RecordedPush {
            access_token: access_token.to_string(),
            to: to.to_string(),
            messages: messages.to_vec(),
        });
        Ok(())
    }

    async fn get_message_content(&self, _access_token: &str, _message_id: &str) -> Result<Bytes> {
        Ok(Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]))
    }
}

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub state: AppState,
    pub line: Arc<RecordingLine>,
}

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test_secret_key".into(),
        uploads_dir: std::env::temp_dir()
            .join(format!("console-uploads-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        public_base_url: "https://console.example.com".into(),
        line_api_base: "http://127.0.0.1:9".into(),
        line_data_api_base: "http://127.0.0.1:9".into(),
        provider_timeout: Duration::from_secs(2),
        token_ttl_hours: 1,
        webhook_rps: 1000,
        bootstrap_owner: None,
    }
}

pub async fn setup_app(line: RecordingLine) -> TestApp {
    setup_app_with(test_config(), line).await
}

pub async fn setup_app_with(config: Config, line: RecordingLine) -> TestApp {
    let pool = create_pool(&config.database_url).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let line = Arc::new(line);
    let state = AppState::new(pool.clone(), &config, line.clone());
    let app = routes::router(state.clone(), config.webhook_rps);

    TestApp {
        app,
        pool,
        state,
        line,
    }
}

impl TestApp {
    pub async fn seed_channel(&self) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO channel_accounts (name, channel_id, channel_secret, access_token, created_at)
             VALUES ('Shop', ?, ?, ?, ?) RETURNING id",
        )
        .bind(CHANNEL_ID)
        .bind(CHANNEL_SECRET)
        .bind(CHANNEL_TOKEN)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await
        .unwrap();
        id
    }

    pub async fn create_staff(&self, username: &str, role: Role) -> User {
        self.state
            .identity_service
            .create_staff(username, "password123", role)
            .await
            .unwrap()
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "username": username, "password": "password123" }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Posts a delivery signed with the seeded channel secret.
    pub async fn deliver(&self, payload: Value) -> (StatusCode, String) {
        let body = serde_json::to_vec(&payload).unwrap();
        let signature = sign(&body, CHANNEL_SECRET);
        self.deliver_raw(body, Some(&signature)).await
    }

    pub async fn deliver_raw(&self, body: Vec<u8>, signature: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/callback")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("x-line-signature", signature);
        }
        let resp = self
            .app
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn count(&self, sql: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(sql).fetch_one(&self.pool).await.unwrap();
        n
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn text_event(user_id: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "timestamp": 1_700_000_000_000i64,
        "source": { "type": "user", "userId": user_id },
        "message": { "type": "text", "id": "m1", "text": text }
    })
}

pub fn delivery(events: Vec<Value>) -> Value {
    json!({ "destination": CHANNEL_ID, "events": events })
}
