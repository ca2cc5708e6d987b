//! # chat-adapters
//!
//! Outbound HTTP clients for the operator chat (Telegram Bot API) and the
//! CI workflow trigger (GitHub `repository_dispatch`).

pub mod github;
pub mod telegram;

use std::time::Duration;

pub use github::GithubDispatchTrigger;
pub use telegram::TelegramNotifier;

/// Builds the shared client used by both adapters.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("briefing-server/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
