//! Write access to `daily_briefings` in the digest file, for the update
//! workflow only.

use std::path::Path;

use async_trait::async_trait;
use domains::{AnalysisWriter, DailyBriefing, UpsertOutcome};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::PoolSettings;

pub struct SqliteAnalysisWriter {
    pool: SqlitePool,
}

impl SqliteAnalysisWriter {
    /// Opens an existing digest file read-write.
    ///
    /// # Developer Note
    /// The file is produced by the collection pipeline. A missing file means
    /// the workflow is running in the wrong checkout, so it is an error here
    /// rather than an empty database.
    pub async fn open(path: impl AsRef<Path>, settings: PoolSettings) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("digest database not found: {}", path.display());
        }

        let options = SqliteConnectOptions::new().filename(path);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl AnalysisWriter for SqliteAnalysisWriter {
    async fn upsert_analysis(&self, briefing: &DailyBriefing) -> anyhow::Result<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT date FROM daily_briefings WHERE date = ?")
                .bind(&briefing.date)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = if existing.is_some() {
            sqlx::query("UPDATE daily_briefings SET analysis = ?, created_at = ? WHERE date = ?")
                .bind(&briefing.analysis)
                .bind(&briefing.created_at)
                .bind(&briefing.date)
                .execute(&mut *tx)
                .await?;
            UpsertOutcome::Updated
        } else {
            sqlx::query("INSERT INTO daily_briefings (date, analysis, created_at) VALUES (?, ?, ?)")
                .bind(&briefing.date)
                .bind(&briefing.analysis)
                .bind(&briefing.created_at)
                .execute(&mut *tx)
                .await?;
            UpsertOutcome::Inserted
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
