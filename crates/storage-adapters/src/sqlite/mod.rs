//! # SQLite adapters
//!
//! `sqlx`-backed implementations of `CommentRepo` (read-write),
//! `ArchiveRepo` (read-only bundled digest file) and `AnalysisWriter`
//! (the update workflow's write path into that same file).

mod analysis;
mod archive;
mod comments;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use analysis::SqliteAnalysisWriter;
pub use archive::SqliteArchiveRepo;
pub use comments::SqliteCommentRepo;

/// Pool sizing shared by every store.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Opens a read-write pool, creating the database file if missing.
///
/// # Developer Note
/// Every connection to `sqlite::memory:` gets its own empty database, so
/// in-memory URLs are pinned to a single connection that never expires.
pub(crate) async fn connect(url: &str, settings: PoolSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let pool_options = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await?;
    Ok(pool)
}
