//! Data mapping between the `comments` table and the domain `Comment`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{millis_rfc3339, BriefingDate, Comment, CommentRepo, NewComment, DEFAULT_NICKNAME};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{connect, PoolSettings};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS comments (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        date        TEXT NOT NULL,
        nickname    TEXT DEFAULT 'anonymous',
        content     TEXT NOT NULL,
        ip_hash     TEXT,
        created_at  TEXT NOT NULL
    )";

const CREATE_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_date ON comments(date)";

pub struct SqliteCommentRepo {
    pool: SqlitePool,
}

impl SqliteCommentRepo {
    /// Connects with default pool settings.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, PoolSettings::default()).await
    }

    pub async fn connect(url: &str, settings: PoolSettings) -> anyhow::Result<Self> {
        Ok(Self::from_pool(connect(url, settings).await?))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Stored form of `created_at`: RFC 3339, millisecond precision, `Z` suffix.
/// Fixed width, so text order equals time order.
fn encode_timestamp(at: &DateTime<Utc>) -> String {
    millis_rfc3339::format(at)
}

fn row_to_comment(row: &SqliteRow) -> anyhow::Result<Comment> {
    let created_at: String = row.try_get("created_at")?;
    let nickname: Option<String> = row.try_get("nickname")?;

    Ok(Comment {
        id: row.try_get("id")?,
        date: BriefingDate::parse(&row.try_get::<String, _>("date")?)?,
        nickname: nickname.unwrap_or_else(|| DEFAULT_NICKNAME.to_string()),
        content: row.try_get("content")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
    })
}

#[async_trait]
impl CommentRepo for SqliteCommentRepo {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_DATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, comment: NewComment) -> anyhow::Result<i64> {
        let result = sqlx::query(
            "INSERT INTO comments (date, nickname, content, ip_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.date.as_str())
        .bind(&comment.nickname)
        .bind(&comment.content)
        .bind(&comment.ip_hash)
        .bind(encode_timestamp(&comment.created_at))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// `ip_hash` is deliberately not selected.
    async fn select_by_date(&self, date: &BriefingDate) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, date, nickname, content, created_at FROM comments WHERE date = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(date.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_comment).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_comment(date: &str, content: &str, at: DateTime<Utc>) -> NewComment {
        NewComment {
            date: BriefingDate::parse(date).unwrap(),
            nickname: "tester".into(),
            content: content.into(),
            ip_hash: "0123456789abcdef".into(),
            created_at: at,
        }
    }

    async fn repo() -> SqliteCommentRepo {
        let repo = SqliteCommentRepo::new("sqlite::memory:").await.unwrap();
        repo.ensure_schema().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let repo = repo().await;
        repo.ensure_schema().await.expect("second schema call");
        repo.ensure_schema().await.expect("third schema call");
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_rows_ordered() {
        let repo = repo().await;
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        // inserted out of time order on purpose
        let late = repo.insert(new_comment("2025-06-01", "late", t0 + Duration::seconds(5))).await.unwrap();
        let early = repo.insert(new_comment("2025-06-01", "early", t0)).await.unwrap();
        let tie = repo.insert(new_comment("2025-06-01", "tie", t0)).await.unwrap();
        repo.insert(new_comment("2025-06-02", "other day", t0)).await.unwrap();
        assert!(late < early && early < tie);

        let date = BriefingDate::parse("2025-06-01").unwrap();
        let listed = repo.select_by_date(&date).await.unwrap();
        let contents: Vec<_> = listed.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["early", "tie", "late"]);
        assert_eq!(listed[0].created_at, t0);
    }

    #[tokio::test]
    async fn ip_hash_is_stored_but_not_read_back() {
        let repo = repo().await;
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        repo.insert(new_comment("2025-06-01", "hi", t0)).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT ip_hash FROM comments")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(stored, "0123456789abcdef");

        let text: String = sqlx::query_scalar("SELECT created_at FROM comments")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(text, "2025-06-01T09:00:00.000Z");
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let repo = SqliteCommentRepo::new("sqlite::memory:").await.unwrap();
        let date = BriefingDate::parse("2025-06-01").unwrap();
        assert!(repo.select_by_date(&date).await.is_err());
    }
}
