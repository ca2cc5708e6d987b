use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use domains::{Comment, DomainError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{error::ApiError, extract::ClientIdentity, messages::COMMENT_WRITE_FAILED, AppState};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

/// `GET /api/comments?date=YYYY-MM-DD`
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<CommentList>, ApiError> {
    let comments = state
        .comments
        .list(query.date.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(CommentList { comments }))
}

/// `POST /api/comments`
///
/// The raw body is handed over undecoded: the rate limit must be checked
/// before any JSON parsing happens.
pub async fn create_comment(
    State(state): State<AppState>,
    ClientIdentity(client): ClientIdentity,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let result = state.comments.submit_json(&client, &body).await;
    state.metrics.record_submission(&result);
    result.map_err(|err| match err {
        DomainError::StoreUnavailable(_) => ApiError::with_message(err, COMMENT_WRITE_FAILED),
        other => other.into(),
    })?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
