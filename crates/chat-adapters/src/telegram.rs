//! Telegram Bot API implementation of `ChatNotifier`.

use async_trait::async_trait;
use domains::ChatNotifier;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: SecretString,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, bot_token: SecretString) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token,
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token.expose_secret())
    }
}

#[async_trait]
impl ChatNotifier for TelegramNotifier {
    /// Sends `text` with HTML parse mode.
    async fn send_message(&self, chat_id: &str, text: &str) -> anyhow::Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        // The URL embeds the bot token: never let it reach an error message.
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("telegram request failed: {}", err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("telegram sendMessage returned {status}");
        }

        debug!(chat_id, "telegram message sent");
        Ok(())
    }
}
