use axum::{
    extract::{Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use services::ChatUpdate;
use tracing::{debug, warn};

use crate::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    pub secret: Option<String>,
}

/// `POST /api/telegram-webhook?secret=...`
///
/// Anything past the secret check is acknowledged with `{ok: true}`, so the
/// chat platform never retries an update.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    Query(query): Query<SecretQuery>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if let Err(err) = state.webhook.authorize(query.secret.as_deref()) {
        state.metrics.record_webhook_rejected();
        return Err(err.into());
    }

    match serde_json::from_slice::<ChatUpdate>(&body) {
        Ok(update) => {
            let outcome = state.webhook.handle(&update).await;
            debug!(?outcome, "webhook update handled");
            state.metrics.record_webhook(&outcome);
        }
        Err(err) => warn!(error = %err, "ignoring undecodable webhook body"),
    }

    Ok(Json(json!({ "ok": true })))
}
