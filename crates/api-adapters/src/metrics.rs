//! # Metrics
//!
//! Prometheus counters for comment writes and webhook updates, exposed in
//! OpenMetrics text format on `/metrics`.

use domains::{DomainError, Result};
use prometheus_client::{
    encoding::{text::encode, EncodeLabelSet},
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use services::WebhookOutcome;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    comment_submissions: Family<OutcomeLabels, Counter>,
    webhook_updates: Family<OutcomeLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("briefing");
        let comment_submissions = Family::<OutcomeLabels, Counter>::default();
        let webhook_updates = Family::<OutcomeLabels, Counter>::default();

        registry.register(
            "comment_submissions",
            "Comment write attempts by outcome",
            comment_submissions.clone(),
        );
        registry.register(
            "webhook_updates",
            "Chat webhook updates by outcome",
            webhook_updates.clone(),
        );

        Self {
            registry,
            comment_submissions,
            webhook_updates,
        }
    }

    pub fn record_submission<T>(&self, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => "created",
            Err(DomainError::RateLimited) => "rate_limited",
            Err(DomainError::StoreUnavailable(_)) => "failed",
            Err(_) => "rejected",
        };
        self.inc(&self.comment_submissions, outcome);
    }

    pub fn record_webhook(&self, outcome: &WebhookOutcome) {
        let outcome = match outcome {
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::UsageHinted => "usage",
            WebhookOutcome::Dispatched { .. } => "dispatched",
            WebhookOutcome::DispatchFailed { .. } => "dispatch_failed",
        };
        self.inc(&self.webhook_updates, outcome);
    }

    pub fn record_webhook_rejected(&self) {
        self.inc(&self.webhook_updates, "unauthorized");
    }

    /// Renders every registered metric.
    pub fn render(&self) -> std::result::Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }

    fn inc(&self, family: &Family<OutcomeLabels, Counter>, outcome: &str) {
        family
            .get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }
}
