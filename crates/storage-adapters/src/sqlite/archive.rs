//! Read-only access to the bundled `news.db` digest file.
//!
//! The file is produced by the collection pipeline; this process never
//! writes to it. A missing file is treated as an empty archive.

use std::path::Path;

use async_trait::async_trait;
use domains::{ArchiveRepo, Article, BriefingDate, DailyBriefing};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use super::PoolSettings;

pub struct SqliteArchiveRepo {
    pool: Option<SqlitePool>,
}

impl SqliteArchiveRepo {
    /// Opens `path` read-only. Returns an empty archive if the file does not
    /// exist.
    pub async fn open(path: impl AsRef<Path>, settings: PoolSettings) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "archive database not found, serving empty archive");
            return Ok(Self::empty());
        }

        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool: Some(pool) })
    }

    pub fn empty() -> Self {
        Self { pool: None }
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_none()
    }
}

fn row_to_article(row: &SqliteRow) -> anyhow::Result<Article> {
    let category: Option<String> = row.try_get("category")?;

    Ok(Article {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        category: category.unwrap_or_default(),
        title: row.try_get("title")?,
        title_original: row.try_get("title_original")?,
        url: row.try_get("url")?,
        summary: row.try_get("summary")?,
        insight: row.try_get("insight")?,
        detected_date: row.try_get("detected_date")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ArchiveRepo for SqliteArchiveRepo {
    async fn all_dates(&self) -> anyhow::Result<Vec<String>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let dates: Vec<String> = sqlx::query_scalar("SELECT DISTINCT date FROM articles ORDER BY date DESC")
            .fetch_all(pool)
            .await?;
        Ok(dates)
    }

    async fn briefing(&self, date: &BriefingDate) -> anyhow::Result<Option<DailyBriefing>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT date, analysis, created_at FROM daily_briefings WHERE date = ?")
            .bind(date.as_str())
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => Ok(Some(DailyBriefing {
                date: row.try_get("date")?,
                analysis: row.try_get("analysis")?,
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn articles(&self, date: &BriefingDate) -> anyhow::Result<Vec<Article>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT id, date, category, title, title_original, url, summary, insight, detected_date, created_at \
             FROM articles WHERE date = ? ORDER BY id ASC",
        )
        .bind(date.as_str())
        .fetch_all(pool)
        .await?;

        rows.iter().map(row_to_article).collect()
    }

    async fn adjacent_dates(
        &self,
        date: &BriefingDate,
    ) -> anyhow::Result<(Option<String>, Option<String>)> {
        let Some(pool) = &self.pool else {
            return Ok((None, None));
        };

        let prev: Option<String> = sqlx::query_scalar(
            "SELECT date FROM articles WHERE date < ? GROUP BY date ORDER BY date DESC LIMIT 1",
        )
        .bind(date.as_str())
        .fetch_optional(pool)
        .await?;

        let next: Option<String> = sqlx::query_scalar(
            "SELECT date FROM articles WHERE date > ? GROUP BY date ORDER BY date ASC LIMIT 1",
        )
        .bind(date.as_str())
        .fetch_optional(pool)
        .await?;

        Ok((prev, next))
    }
}
