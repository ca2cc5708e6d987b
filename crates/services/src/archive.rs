//! # Archive Service
//!
//! Read-only views over the bundled daily digests.

use std::collections::BTreeMap;
use std::sync::Arc;

use domains::{ArchiveRepo, BriefingDate, DailyData, DomainError, Result};
use tracing::error;

pub struct ArchiveService {
    repo: Arc<dyn ArchiveRepo>,
}

impl ArchiveService {
    pub fn new(repo: Arc<dyn ArchiveRepo>) -> Self {
        Self { repo }
    }

    /// Days with articles, newest first.
    pub async fn all_dates(&self) -> Result<Vec<String>> {
        self.repo.all_dates().await.map_err(|err| {
            error!(error = %format!("{err:#}"), "archive date listing failed");
            DomainError::store(err)
        })
    }

    pub async fn latest_date(&self) -> Result<Option<String>> {
        Ok(self.all_dates().await?.into_iter().next())
    }

    /// Dates grouped by `YYYY-MM`, each group newest first.
    pub async fn dates_by_month(&self) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(group_by_month(self.all_dates().await?))
    }

    /// A full day: briefing, articles and navigation neighbours.
    ///
    /// A day without articles is reported as not found even if a briefing
    /// row exists for it.
    pub async fn daily(&self, date: &str) -> Result<DailyData> {
        let date = BriefingDate::parse(date)?;

        match self.load_day(&date).await {
            Ok(Some(data)) => Ok(data),
            Ok(None) => Err(DomainError::NotFound(format!("briefing for {date}"))),
            Err(err) => {
                error!(%date, error = %format!("{err:#}"), "archive day read failed");
                Err(DomainError::store(err))
            }
        }
    }

    async fn load_day(&self, date: &BriefingDate) -> anyhow::Result<Option<DailyData>> {
        let articles = self.repo.articles(date).await?;
        if articles.is_empty() {
            return Ok(None);
        }
        let briefing = self.repo.briefing(date).await?;
        let (prev_date, next_date) = self.repo.adjacent_dates(date).await?;

        Ok(Some(DailyData {
            briefing,
            articles,
            prev_date,
            next_date,
        }))
    }
}

/// Groups `YYYY-MM-DD` strings by their month prefix, preserving input order
/// within each group. Strings too short to carry a month are skipped.
pub fn group_by_month(dates: Vec<String>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for date in dates {
        let Some(month) = date.get(..7) else {
            continue;
        };
        grouped.entry(month.to_string()).or_default().push(date);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Article, MockArchiveRepo};

    fn article(id: i64, date: &str) -> Article {
        Article {
            id,
            date: date.to_string(),
            category: "국내".to_string(),
            title: format!("title {id}"),
            title_original: None,
            url: format!("https://example.com/{id}"),
            summary: None,
            insight: None,
            detected_date: None,
            created_at: "2025-06-01T08:00:00+09:00".to_string(),
        }
    }

    #[test]
    fn months_group_in_input_order() {
        let grouped = group_by_month(vec![
            "2025-06-02".into(),
            "2025-06-01".into(),
            "2025-05-31".into(),
            "bad".into(),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["2025-06"], vec!["2025-06-02", "2025-06-01"]);
        assert_eq!(grouped["2025-05"], vec!["2025-05-31"]);
    }

    #[tokio::test]
    async fn latest_is_first_date() {
        let mut repo = MockArchiveRepo::new();
        repo.expect_all_dates()
            .returning(|| Ok(vec!["2025-06-02".into(), "2025-06-01".into()]));
        let service = ArchiveService::new(Arc::new(repo));
        assert_eq!(service.latest_date().await, Ok(Some("2025-06-02".into())));
    }

    #[tokio::test]
    async fn daily_assembles_neighbours() {
        let mut repo = MockArchiveRepo::new();
        repo.expect_articles()
            .returning(|d| Ok(vec![article(1, d.as_str()), article(2, d.as_str())]));
        repo.expect_briefing().returning(|_| Ok(None));
        repo.expect_adjacent_dates()
            .returning(|_| Ok((Some("2025-05-30".into()), None)));

        let data = ArchiveService::new(Arc::new(repo)).daily("2025-06-01").await.unwrap();
        assert_eq!(data.articles.len(), 2);
        assert_eq!(data.prev_date.as_deref(), Some("2025-05-30"));
        assert_eq!(data.next_date, None);
    }

    #[tokio::test]
    async fn day_without_articles_is_not_found() {
        let mut repo = MockArchiveRepo::new();
        repo.expect_articles().returning(|_| Ok(vec![]));
        repo.expect_briefing().never();

        let result = ArchiveService::new(Arc::new(repo)).daily("2025-06-01").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn malformed_day_is_rejected_without_query() {
        let mut repo = MockArchiveRepo::new();
        repo.expect_articles().never();

        let result = ArchiveService::new(Arc::new(repo)).daily("yesterday").await;
        assert_eq!(result, Err(DomainError::InvalidDate));
    }
}
