//! # DomainError
//!
//! Centralized error handling for the briefing server.
//! Maps comment, archive and webhook failures to actionable error types.

use thiserror::Error;

/// The primary error type for all service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Date is missing or not shaped like `YYYY-MM-DD`.
    #[error("invalid date: expected YYYY-MM-DD")]
    InvalidDate,

    /// Comment body is missing or blank after trimming.
    #[error("comment content is empty")]
    EmptyContent,

    #[error("comment content exceeds {max} characters")]
    ContentTooLong { max: usize },

    /// Request body could not be decoded as JSON.
    #[error("malformed request body")]
    MalformedBody,

    /// Per-client write budget for the current window is spent.
    #[error("too many requests")]
    RateLimited,

    /// Infrastructure failure (e.g., database locked, file unreadable)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Shared secret did not match.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),
}

impl DomainError {
    /// Wraps an adapter failure, keeping only its rendered chain.
    pub fn store(err: anyhow::Error) -> Self {
        DomainError::StoreUnavailable(format!("{err:#}"))
    }
}

/// A specialized Result type for domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
