//! # storage-adapters
//!
//! Implementations of the persistence and admission ports.
//! SQLite support is compiled in with the `db-sqlite` feature.

pub mod rate_limit;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use rate_limit::{FixedWindowLimiter, RateLimitPolicy};

#[cfg(feature = "db-sqlite")]
pub use sqlite::{PoolSettings, SqliteAnalysisWriter, SqliteArchiveRepo, SqliteCommentRepo};
