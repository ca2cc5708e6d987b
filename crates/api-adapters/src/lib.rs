//! # api-adapters
//!
//! The web routing and orchestration layer for the briefing server.
//!
//! Everything HTTP-specific lives behind the `web-axum` feature; the
//! localized error messages are framework independent.

pub mod messages;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use state::AppState;

#[cfg(feature = "web-axum")]
use axum::{
    routing::{get, post},
    Router,
};

/// Builds the full application router.
///
/// # Developer Note
/// Routes are registered without a prefix; the binary nests or mounts the
/// result as it sees fit.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        // Reader comments
        .route(
            "/api/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        // Operator chat commands
        .route("/api/telegram-webhook", post(handlers::webhook::telegram_webhook))
        // Digest archive
        .route("/api/dates", get(handlers::archive::list_dates))
        .route("/api/dates/latest", get(handlers::archive::latest_date))
        .route("/api/months", get(handlers::archive::list_months))
        .route("/api/daily/{date}", get(handlers::archive::daily))
        // Operations
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics));

    middleware::apply(routes).with_state(state)
}
