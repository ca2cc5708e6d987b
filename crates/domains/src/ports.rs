//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.

use async_trait::async_trait;

use crate::models::{
    Article, BriefingDate, ClientKey, Comment, DailyBriefing, NewComment, UpsertOutcome,
};

/// Persistence contract for reader comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Idempotently creates the comments table and its date index.
    async fn ensure_schema(&self) -> anyhow::Result<()>;

    /// Appends a comment and returns the id assigned by the store.
    async fn insert(&self, comment: NewComment) -> anyhow::Result<i64>;

    /// All comments for `date`, oldest first (ties by id).
    async fn select_by_date(&self, date: &BriefingDate) -> anyhow::Result<Vec<Comment>>;
}

/// Write admission keyed by client identity.
///
/// Kept behind a trait so a shared store can replace the in-process map
/// without touching callers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RateLimiter: Send + Sync {
    /// Returns `true` if the attempt is admitted. Admitted attempts are counted.
    fn admit(&self, key: &ClientKey) -> bool;
}

/// Read-only access to the bundled daily digest database.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ArchiveRepo: Send + Sync {
    /// Distinct days that have articles, newest first.
    async fn all_dates(&self) -> anyhow::Result<Vec<String>>;

    async fn briefing(&self, date: &BriefingDate) -> anyhow::Result<Option<DailyBriefing>>;

    /// Articles of a day in insertion order.
    async fn articles(&self, date: &BriefingDate) -> anyhow::Result<Vec<Article>>;

    /// Nearest earlier and later days that have articles.
    async fn adjacent_dates(
        &self,
        date: &BriefingDate,
    ) -> anyhow::Result<(Option<String>, Option<String>)>;
}

/// Write side of the digest database, used by the workflow that receives
/// operator analysis. The web server never holds one.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AnalysisWriter: Send + Sync {
    /// Inserts the briefing row of `briefing.date`, or replaces its analysis
    /// and timestamp if the row already exists.
    async fn upsert_analysis(&self, briefing: &DailyBriefing) -> anyhow::Result<UpsertOutcome>;
}

/// Outbound chat messages to the operator.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Starts the external content-regeneration workflow.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    /// Fails if the trigger API could not be reached or refused the request.
    async fn dispatch(&self, analysis: &str, date: &str) -> anyhow::Result<()>;
}
