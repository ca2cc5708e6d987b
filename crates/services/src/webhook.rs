//! # Webhook Service
//!
//! Turns an operator's chat command into a workflow dispatch and reports
//! back over the same chat.
//!
//! Every outcome is acknowledged to the chat platform as success; upstream
//! failures reach the operator only as reply text.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domains::{ChatNotifier, Clock, DomainError, Result, WorkflowTrigger};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Default command prefix ("analysis").
pub const DEFAULT_COMMAND: &str = "/분석";

/// Payload dates are stamped in this fixed offset (KST, UTC+9).
const STAMP_OFFSET_SECS: i64 = 9 * 60 * 60;

const USAGE_REPLY: &str = "사용법: /분석 [분석 내용]\n\n분석 내용을 함께 보내주세요.";
const FAILURE_REPLY: &str = "GitHub Actions 트리거 실패. GH_PAT 환경변수를 확인해주세요.";

/// The subset of a Telegram `Update` this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatUpdate {
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// Telegram sends numeric ids; some relays forward them as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

impl ChatId {
    pub fn to_key(&self) -> String {
        match self {
            ChatId::Number(id) => id.to_string(),
            ChatId::Text(id) => id.clone(),
        }
    }
}

/// What happened to an update, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// No text, foreign chat, or not the command.
    Ignored,
    /// Command without payload; a usage hint was sent.
    UsageHinted,
    Dispatched { date: String },
    DispatchFailed { date: String },
}

#[derive(Debug)]
pub struct WebhookSettings {
    /// Shared secret expected in the `secret` query parameter. Empty or
    /// absent disables the check.
    pub secret: Option<SecretString>,
    /// The only chat allowed to issue commands.
    pub chat_id: String,
    pub command: String,
}

/// Compares fixed-length digests without an early exit, so timing does not
/// reveal how much of a guess was right.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

pub struct WebhookService {
    notifier: Arc<dyn ChatNotifier>,
    trigger: Arc<dyn WorkflowTrigger>,
    clock: Arc<dyn Clock>,
    settings: WebhookSettings,
}

impl WebhookService {
    pub fn new(
        notifier: Arc<dyn ChatNotifier>,
        trigger: Arc<dyn WorkflowTrigger>,
        clock: Arc<dyn Clock>,
        settings: WebhookSettings,
    ) -> Self {
        Self {
            notifier,
            trigger,
            clock,
            settings,
        }
    }

    /// Checks the caller-provided secret against the configured one.
    pub fn authorize(&self, provided: Option<&str>) -> Result<()> {
        let expected = match &self.settings.secret {
            Some(secret) if !secret.expose_secret().is_empty() => secret.expose_secret(),
            _ => return Ok(()),
        };

        if provided.is_some_and(|provided| secrets_match(provided, expected)) {
            Ok(())
        } else {
            warn!("webhook secret mismatch");
            Err(DomainError::Unauthorized)
        }
    }

    pub async fn handle(&self, update: &ChatUpdate) -> WebhookOutcome {
        // 1. Only text messages from the operator's chat
        let Some(message) = &update.message else {
            return WebhookOutcome::Ignored;
        };
        let Some(text) = message.text.as_deref() else {
            return WebhookOutcome::Ignored;
        };
        let chat_id = message.chat.id.to_key();
        if chat_id != self.settings.chat_id {
            info!(%chat_id, "ignoring message from unauthorized chat");
            return WebhookOutcome::Ignored;
        }

        // 2. Command recognition
        let Some(analysis) = extract_payload(text, &self.settings.command) else {
            return WebhookOutcome::Ignored;
        };
        if analysis.is_empty() {
            self.reply(&chat_id, USAGE_REPLY).await;
            return WebhookOutcome::UsageHinted;
        }

        // 3. Relay to the workflow
        let date = stamp_date(self.clock.now());
        match self.trigger.dispatch(analysis, &date).await {
            Ok(()) => {
                info!(%date, chars = analysis.chars().count(), "analysis update dispatched");
                let text = format!("<b>{date} 분석 업데이트 요청 완료</b>\n\n웹사이트에 2~3분 내 반영됩니다.");
                self.reply(&chat_id, &text).await;
                WebhookOutcome::Dispatched { date }
            }
            Err(err) => {
                warn!(%date, error = %format!("{err:#}"), "workflow dispatch failed");
                self.reply(&chat_id, FAILURE_REPLY).await;
                WebhookOutcome::DispatchFailed { date }
            }
        }
    }

    async fn reply(&self, chat_id: &str, text: &str) {
        if let Err(err) = self.notifier.send_message(chat_id, text).await {
            warn!(chat_id, error = %format!("{err:#}"), "chat reply failed");
        }
    }
}

/// Returns the trimmed text after `command`, or `None` if `text` is not the
/// command.
pub fn extract_payload<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    text.strip_prefix(command).map(str::trim)
}

/// Calendar day of `now` in the fixed UTC+9 offset.
pub fn stamp_date(now: DateTime<Utc>) -> String {
    (now + Duration::seconds(STAMP_OFFSET_SECS))
        .format("%Y-%m-%d")
        .to_string()
}

/// Full local timestamp in the same offset, e.g. `2025-06-03T00:30:00.000000+09:00`.
pub fn stamp_timestamp(now: DateTime<Utc>) -> String {
    (now + Duration::seconds(STAMP_OFFSET_SECS))
        .format("%Y-%m-%dT%H:%M:%S%.6f+09:00")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::{ManualClock, MockChatNotifier, MockWorkflowTrigger};
    use mockall::predicate::eq;

    const OPERATOR: &str = "424242";

    fn settings(secret: Option<&str>) -> WebhookSettings {
        WebhookSettings {
            secret: secret.map(|s| SecretString::from(s.to_string())),
            chat_id: OPERATOR.to_string(),
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    fn clock() -> Arc<ManualClock> {
        // 2025-06-01 16:30 UTC is already 2025-06-02 in KST
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 16, 30, 0).unwrap()))
    }

    fn update(chat: i64, text: Option<&str>) -> ChatUpdate {
        ChatUpdate {
            message: Some(ChatMessage {
                chat: Chat { id: ChatId::Number(chat) },
                text: text.map(str::to_string),
            }),
        }
    }

    fn service(notifier: MockChatNotifier, trigger: MockWorkflowTrigger) -> WebhookService {
        WebhookService::new(Arc::new(notifier), Arc::new(trigger), clock(), settings(None))
    }

    #[test]
    fn payload_extraction() {
        assert_eq!(extract_payload("/분석  금리 동향 ", "/분석"), Some("금리 동향"));
        assert_eq!(extract_payload("/분석", "/분석"), Some(""));
        assert_eq!(extract_payload("hello /분석 x", "/분석"), None);
    }

    #[test]
    fn stamp_uses_utc_plus_nine() {
        let late = Utc.with_ymd_and_hms(2025, 12, 31, 15, 0, 0).unwrap();
        assert_eq!(stamp_date(late), "2026-01-01");
        let early = Utc.with_ymd_and_hms(2025, 12, 31, 14, 59, 59).unwrap();
        assert_eq!(stamp_date(early), "2025-12-31");
        assert_eq!(stamp_timestamp(early), "2025-12-31T23:59:59.000000+09:00");
    }

    #[test]
    fn authorize_checks_configured_secret() {
        let open = WebhookService::new(
            Arc::new(MockChatNotifier::new()),
            Arc::new(MockWorkflowTrigger::new()),
            clock(),
            settings(Some("")),
        );
        assert!(open.authorize(None).is_ok());

        let guarded = WebhookService::new(
            Arc::new(MockChatNotifier::new()),
            Arc::new(MockWorkflowTrigger::new()),
            clock(),
            settings(Some("s3cret")),
        );
        assert!(guarded.authorize(Some("s3cret")).is_ok());
        assert_eq!(guarded.authorize(Some("nope")), Err(DomainError::Unauthorized));
        assert_eq!(guarded.authorize(None), Err(DomainError::Unauthorized));
    }

    #[test]
    fn secret_comparison_is_exact() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cre", "s3cret"));
        assert!(!secrets_match("s3cret ", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[tokio::test]
    async fn ignores_foreign_chats_and_plain_text() {
        let mut notifier = MockChatNotifier::new();
        notifier.expect_send_message().never();
        let mut trigger = MockWorkflowTrigger::new();
        trigger.expect_dispatch().never();
        let svc = service(notifier, trigger);

        assert_eq!(svc.handle(&ChatUpdate::default()).await, WebhookOutcome::Ignored);
        assert_eq!(svc.handle(&update(1, Some("/분석 x"))).await, WebhookOutcome::Ignored);
        assert_eq!(svc.handle(&update(424242, None)).await, WebhookOutcome::Ignored);
        assert_eq!(svc.handle(&update(424242, Some("hi"))).await, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn empty_payload_sends_usage() {
        let mut notifier = MockChatNotifier::new();
        notifier
            .expect_send_message()
            .with(eq(OPERATOR), eq(USAGE_REPLY))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut trigger = MockWorkflowTrigger::new();
        trigger.expect_dispatch().never();

        let outcome = service(notifier, trigger).handle(&update(424242, Some("/분석   "))).await;
        assert_eq!(outcome, WebhookOutcome::UsageHinted);
    }

    #[tokio::test]
    async fn dispatches_with_kst_date() {
        let mut trigger = MockWorkflowTrigger::new();
        trigger
            .expect_dispatch()
            .with(eq("환율 급등 대응"), eq("2025-06-02"))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut notifier = MockChatNotifier::new();
        notifier
            .expect_send_message()
            .withf(|chat, text| chat == OPERATOR && text.starts_with("<b>2025-06-02 "))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = service(notifier, trigger)
            .handle(&update(424242, Some("/분석 환율 급등 대응")))
            .await;
        assert_eq!(outcome, WebhookOutcome::Dispatched { date: "2025-06-02".into() });
    }

    #[tokio::test]
    async fn dispatch_failure_is_reported_to_operator() {
        let mut trigger = MockWorkflowTrigger::new();
        trigger
            .expect_dispatch()
            .returning(|_, _| Err(anyhow::anyhow!("401 Bad credentials")));
        let mut notifier = MockChatNotifier::new();
        notifier
            .expect_send_message()
            .with(eq(OPERATOR), eq(FAILURE_REPLY))
            .times(1)
            // a failing reply must not change the outcome
            .returning(|_, _| Err(anyhow::anyhow!("telegram down")));

        let outcome = service(notifier, trigger)
            .handle(&update(424242, Some("/분석 x")))
            .await;
        assert_eq!(outcome, WebhookOutcome::DispatchFailed { date: "2025-06-02".into() });
    }

    #[test]
    fn chat_id_accepts_strings() {
        let parsed: ChatUpdate =
            serde_json::from_str(r#"{"message":{"chat":{"id":"424242"},"text":"/분석 a"}}"#).unwrap();
        assert_eq!(parsed.message.unwrap().chat.id.to_key(), OPERATOR);
    }
}
