//! # Briefing Server Binary
//!
//! The entry point that assembles adapters and services from configuration
//! and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use chat_adapters::{http_client, GithubDispatchTrigger, TelegramNotifier};
use configs::{LogFormat, Settings};
use domains::{Clock, CommentRepo, SystemClock};
use secrecy::SecretString;
use services::{ArchiveService, CommentService, WebhookService, WebhookSettings};
use storage_adapters::{
    FixedWindowLimiter, PoolSettings, RateLimitPolicy, SqliteArchiveRepo, SqliteCommentRepo,
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(settings.log.format);
    settings.log_summary();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let pool = PoolSettings {
        max_connections: settings.database.max_connections,
        acquire_timeout: settings.database.acquire_timeout(),
    };

    // 1. Comment store (read-write, created on first start)
    let comment_repo = SqliteCommentRepo::connect(&settings.database.comments_url, pool)
        .await
        .context("opening comment database")?;
    comment_repo
        .ensure_schema()
        .await
        .context("preparing comment schema")?;

    // 2. Archive store (read-only, may be absent)
    let archive_repo = SqliteArchiveRepo::open(&settings.database.archive_path, pool)
        .await
        .context("opening archive database")?;

    // 3. Admission control
    let limiter = FixedWindowLimiter::with_clock(
        RateLimitPolicy {
            max_requests: settings.rate_limit.max_requests,
            window: chrono::Duration::seconds(i64::try_from(settings.rate_limit.window_secs)?),
        },
        clock.clone(),
    );

    // 4. Outbound chat + workflow clients
    let client = http_client(settings.http_client.timeout()).context("building HTTP client")?;
    let bot_token = settings.telegram.bot_token.unwrap_or_else(|| {
        warn!("telegram.bot_token not set, chat replies will fail");
        SecretString::from(String::new())
    });
    if settings.github.token.is_none() {
        warn!("github.token not set, workflow dispatches will be rejected");
    }
    let notifier = TelegramNotifier::new(client.clone(), settings.telegram.api_base, bot_token);
    let trigger = GithubDispatchTrigger::new(
        client,
        settings.github.api_base,
        settings.github.repo,
        settings.github.token,
    );

    // 5. Services
    let comments = CommentService::new(Arc::new(comment_repo), Arc::new(limiter), clock.clone())
        .with_default_nickname(settings.comments.default_nickname);
    let webhook = WebhookService::new(
        Arc::new(notifier),
        Arc::new(trigger),
        clock,
        WebhookSettings {
            secret: settings.telegram.webhook_secret,
            chat_id: settings.telegram.chat_id,
            command: settings.telegram.command,
        },
    );
    let archive = ArchiveService::new(Arc::new(archive_repo));

    let app = api_adapters::router(AppState::new(comments, webhook, archive));

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "briefing server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("briefing server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the default `info` filter.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
