//! # Analysis Publisher
//!
//! Receiving end of the `update-analysis` dispatch: writes the operator's
//! analysis into the digest database so the next site build shows it.

use std::sync::Arc;

use domains::{AnalysisWriter, BriefingDate, Clock, DailyBriefing, DomainError, Result, UpsertOutcome};
use tracing::{error, info};

use crate::webhook::stamp_timestamp;

pub struct AnalysisService {
    writer: Arc<dyn AnalysisWriter>,
    clock: Arc<dyn Clock>,
}

impl AnalysisService {
    pub fn new(writer: Arc<dyn AnalysisWriter>, clock: Arc<dyn Clock>) -> Self {
        Self { writer, clock }
    }

    /// Stores `analysis` as the briefing of `date`, stamped with the current
    /// KST time. An existing briefing for the day is replaced.
    pub async fn publish(&self, date: &str, analysis: &str) -> Result<UpsertOutcome> {
        let date = BriefingDate::parse(date)?;
        let briefing = DailyBriefing {
            date: date.to_string(),
            analysis: analysis.to_string(),
            created_at: stamp_timestamp(self.clock.now()),
        };

        let outcome = self.writer.upsert_analysis(&briefing).await.map_err(|err| {
            error!(%date, error = %format!("{err:#}"), "analysis write failed");
            DomainError::store(err)
        })?;

        info!(%date, ?outcome, chars = analysis.chars().count(), "analysis stored");
        Ok(outcome)
    }
}
