//! # update-analysis
//!
//! Run by the `update-analysis` workflow: stores the operator's analysis
//! for a day in the digest database that the site is built from.
//!
//! ```text
//! update-analysis 2025-06-03 "## 금리 전망 ..."
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use configs::{LogFormat, Settings};
use domains::{SystemClock, UpsertOutcome};
use services::AnalysisService;
use storage_adapters::{PoolSettings, SqliteAnalysisWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "update-analysis")]
#[command(about = "Insert or replace the analysis report of a day", long_about = None)]
struct Cli {
    /// Day of the briefing (YYYY-MM-DD)
    date: String,

    /// Analysis text, stored as-is
    analysis: String,

    /// Digest database; defaults to `database.archive_path` from settings
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(settings.log.format);

    let path = cli
        .db
        .unwrap_or_else(|| PathBuf::from(&settings.database.archive_path));
    let pool = PoolSettings {
        max_connections: 1,
        acquire_timeout: settings.database.acquire_timeout(),
    };

    let writer = Arc::new(
        SqliteAnalysisWriter::open(&path, pool)
            .await
            .context("opening digest database")?,
    );
    let service = AnalysisService::new(writer.clone(), Arc::new(SystemClock));

    let outcome = service.publish(&cli.date, &cli.analysis).await;
    writer.close().await;

    match outcome.with_context(|| format!("updating analysis for {}", cli.date))? {
        UpsertOutcome::Inserted => info!(date = %cli.date, path = %path.display(), "inserted analysis"),
        UpsertOutcome::Updated => info!(date = %cli.date, path = %path.display(), "updated analysis"),
    }
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
