//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use api_adapters::AppState;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use domains::{
    ArchiveRepo, ChatNotifier, CommentRepo, ManualClock, MockChatNotifier, MockWorkflowTrigger,
    WorkflowTrigger,
};
use secrecy::SecretString;
use serde_json::Value;
use services::{ArchiveService, CommentService, WebhookService, WebhookSettings};
use storage_adapters::{FixedWindowLimiter, RateLimitPolicy, SqliteArchiveRepo, SqliteCommentRepo};
use tower::ServiceExt;

pub const OPERATOR_CHAT: &str = "424242";
pub const MEMORY_URL: &str = "sqlite::memory:";

/// 2025-06-02 09:00 KST.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

pub async fn memory_comment_repo() -> SqliteCommentRepo {
    let repo = SqliteCommentRepo::new(MEMORY_URL).await.unwrap();
    repo.ensure_schema().await.unwrap();
    repo
}

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

/// Assembles a router over in-memory stores and mocked outbound clients.
///
/// Mocks without expectations panic when called, so a test that does not
/// configure the notifier or trigger asserts they stay untouched.
pub struct TestAppBuilder {
    comment_repo: Option<Arc<dyn CommentRepo>>,
    archive_repo: Arc<dyn ArchiveRepo>,
    notifier: Arc<dyn ChatNotifier>,
    trigger: Arc<dyn WorkflowTrigger>,
    secret: Option<String>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            comment_repo: None,
            archive_repo: Arc::new(SqliteArchiveRepo::empty()),
            notifier: Arc::new(MockChatNotifier::new()),
            trigger: Arc::new(MockWorkflowTrigger::new()),
            secret: None,
        }
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment_repo(mut self, repo: impl CommentRepo + 'static) -> Self {
        self.comment_repo = Some(Arc::new(repo));
        self
    }

    pub fn archive_repo(mut self, repo: impl ArchiveRepo + 'static) -> Self {
        self.archive_repo = Arc::new(repo);
        self
    }

    pub fn notifier(mut self, notifier: MockChatNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn trigger(mut self, trigger: MockWorkflowTrigger) -> Self {
        self.trigger = Arc::new(trigger);
        self
    }

    pub fn secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }

    pub async fn build(self) -> TestApp {
        let clock = Arc::new(ManualClock::new(start_time()));
        let comment_repo = match self.comment_repo {
            Some(repo) => repo,
            None => Arc::new(memory_comment_repo().await),
        };
        let limiter = FixedWindowLimiter::with_clock(RateLimitPolicy::default(), clock.clone());

        let comments = CommentService::new(comment_repo, Arc::new(limiter), clock.clone());
        let webhook = WebhookService::new(
            self.notifier,
            self.trigger,
            clock.clone(),
            WebhookSettings {
                secret: self.secret.map(SecretString::from),
                chat_id: OPERATOR_CHAT.to_string(),
                command: services::webhook::DEFAULT_COMMAND.to_string(),
            },
        );
        let archive = ArchiveService::new(self.archive_repo);

        TestApp {
            router: api_adapters::router(AppState::new(comments, webhook, archive)),
            clock,
        }
    }
}

impl TestApp {
    /// Sends `request` and decodes the body as JSON, or as a JSON string
    /// when it is plain text.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_comment(&self, client: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::post("/api/comments")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", client)
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_webhook(&self, query: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::post(format!("/api/telegram-webhook{query}"))
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        self.send(request).await
    }
}

pub fn comment_body(date: &str, nickname: Option<&str>, content: &str) -> String {
    let mut body = serde_json::json!({ "date": date, "content": content });
    if let Some(nickname) = nickname {
        body["nickname"] = Value::from(nickname);
    }
    body.to_string()
}

pub fn chat_update(chat_id: i64, text: &str) -> String {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "chat": { "id": chat_id, "type": "private" },
            "text": text,
        }
    })
    .to_string()
}
