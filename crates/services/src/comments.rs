//! # Comment Service
//!
//! Orchestrates rate limiting, validation and persistence of reader comments.
//!
//! # Developer Note
//! The limiter runs before the body is even decoded, so malformed or invalid
//! payloads still spend the caller's write budget.

use std::sync::Arc;

use chrono::SubsecRound;
use domains::{
    BriefingDate, ClientKey, Clock, Comment, CommentRepo, DomainError, NewComment, RateLimiter,
    Result, SubmitComment, DEFAULT_NICKNAME, MAX_CONTENT_CHARS, MAX_NICKNAME_CHARS,
};
use tracing::{error, info, warn};

pub struct CommentService {
    repo: Arc<dyn CommentRepo>,
    limiter: Arc<dyn RateLimiter>,
    clock: Arc<dyn Clock>,
    default_nickname: String,
}

impl CommentService {
    pub fn new(
        repo: Arc<dyn CommentRepo>,
        limiter: Arc<dyn RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            limiter,
            clock,
            default_nickname: DEFAULT_NICKNAME.to_string(),
        }
    }

    /// Overrides the placeholder stored for anonymous commenters.
    pub fn with_default_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.default_nickname = nickname.into();
        self
    }

    /// Rate limit, then decode `body` as JSON, then validate and persist.
    pub async fn submit_json(&self, client_key: &ClientKey, body: &[u8]) -> Result<i64> {
        self.admit(client_key)?;

        let request: SubmitComment =
            serde_json::from_slice(body).map_err(|_| DomainError::MalformedBody)?;

        self.persist(client_key, request).await
    }

    /// Rate limit, then validate and persist an already decoded request.
    pub async fn submit(&self, client_key: &ClientKey, request: SubmitComment) -> Result<i64> {
        self.admit(client_key)?;
        self.persist(client_key, request).await
    }

    /// Comments of a day, oldest first.
    ///
    /// Store failures are logged and degrade to an empty list; only a
    /// malformed date is reported to the caller.
    pub async fn list(&self, date: &str) -> Result<Vec<Comment>> {
        let date = BriefingDate::parse(date)?;

        match self.repo.select_by_date(&date).await {
            Ok(comments) => Ok(comments),
            Err(err) => {
                warn!(%date, error = %format!("{err:#}"), "comment read failed, serving empty list");
                Ok(Vec::new())
            }
        }
    }

    fn admit(&self, client_key: &ClientKey) -> Result<()> {
        if self.limiter.admit(client_key) {
            Ok(())
        } else {
            warn!(client = %client_key, "comment write rate limited");
            Err(DomainError::RateLimited)
        }
    }

    async fn persist(&self, client_key: &ClientKey, request: SubmitComment) -> Result<i64> {
        // 1. Validation, in the order callers observe errors
        let date = BriefingDate::parse(request.date.as_deref().unwrap_or_default())?;
        let content = validate_content(request.content.as_deref())?;
        let nickname = normalize_nickname(request.nickname.as_deref(), &self.default_nickname);

        // 2. Server-side timestamp, millisecond precision like the stored text
        let comment = NewComment {
            date,
            nickname,
            content,
            ip_hash: client_key.as_str().to_string(),
            created_at: self.clock.now().trunc_subsecs(3),
        };
        let date = comment.date.clone();

        // 3. Persistence
        self.repo.ensure_schema().await.map_err(|err| {
            error!(error = %format!("{err:#}"), "comment schema check failed");
            DomainError::store(err)
        })?;

        let id = self.repo.insert(comment).await.map_err(|err| {
            error!(%date, error = %format!("{err:#}"), "comment insert failed");
            DomainError::store(err)
        })?;

        info!(id, %date, client = %client_key, "comment stored");
        Ok(id)
    }
}

/// Trims the body and enforces the non-empty and length bounds.
pub fn validate_content(raw: Option<&str>) -> Result<String> {
    let trimmed = raw.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        return Err(DomainError::EmptyContent);
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(DomainError::ContentTooLong {
            max: MAX_CONTENT_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

/// Trims, falls back to `placeholder` when blank, then truncates.
pub fn normalize_nickname(raw: Option<&str>, placeholder: &str) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let chosen = if trimmed.is_empty() { placeholder } else { trimmed };

    chosen.chars().take(MAX_NICKNAME_CHARS).collect()
}
