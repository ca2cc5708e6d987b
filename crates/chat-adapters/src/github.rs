//! GitHub `repository_dispatch` implementation of `WorkflowTrigger`.
//!
//! The receiving workflow listens for `update-analysis` and writes the
//! payload into the archive database before redeploying the site.

use async_trait::async_trait;
use domains::WorkflowTrigger;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const EVENT_TYPE: &str = "update-analysis";

#[derive(Debug, Serialize)]
struct Dispatch<'a> {
    event_type: &'static str,
    client_payload: Payload<'a>,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    analysis: &'a str,
    date: &'a str,
}

pub struct GithubDispatchTrigger {
    client: reqwest::Client,
    api_base: String,
    /// `owner/name`
    repo: String,
    token: Option<SecretString>,
}

impl GithubDispatchTrigger {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        repo: impl Into<String>,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            repo: repo.into(),
            token,
        }
    }

    fn dispatch_url(&self) -> String {
        format!("{}/repos/{}/dispatches", self.api_base, self.repo)
    }
}

#[async_trait]
impl WorkflowTrigger for GithubDispatchTrigger {
    async fn dispatch(&self, analysis: &str, date: &str) -> anyhow::Result<()> {
        let body = Dispatch {
            event_type: EVENT_TYPE,
            client_payload: Payload { analysis, date },
        };

        let mut request = self
            .client
            .post(self.dispatch_url())
            .header(ACCEPT, "application/vnd.github.v3+json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("repository dispatch to {} returned {status}", self.repo);
        }

        info!(repo = %self.repo, date, "repository dispatch accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_body_shape() {
        let body = Dispatch {
            event_type: EVENT_TYPE,
            client_payload: Payload {
                analysis: "rates up",
                date: "2025-06-02",
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "event_type": "update-analysis",
                "client_payload": {"analysis": "rates up", "date": "2025-06-02"}
            })
        );
    }

    #[test]
    fn dispatch_url_for_repo() {
        let trigger = GithubDispatchTrigger::new(reqwest::Client::new(), DEFAULT_API_BASE, "acme/news", None);
        assert_eq!(trigger.dispatch_url(), "https://api.github.com/repos/acme/news/dispatches");
    }
}
