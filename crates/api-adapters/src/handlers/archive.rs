//! Read-only views over the digest archive.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use domains::DailyData;
use serde::Serialize;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct DateList {
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LatestDate {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MonthIndex {
    pub months: BTreeMap<String, Vec<String>>,
}

pub async fn list_dates(State(state): State<AppState>) -> Result<Json<DateList>, ApiError> {
    let dates = state.archive.all_dates().await?;
    Ok(Json(DateList { dates }))
}

pub async fn latest_date(State(state): State<AppState>) -> Result<Json<LatestDate>, ApiError> {
    let date = state.archive.latest_date().await?;
    Ok(Json(LatestDate { date }))
}

pub async fn list_months(State(state): State<AppState>) -> Result<Json<MonthIndex>, ApiError> {
    let months = state.archive.dates_by_month().await?;
    Ok(Json(MonthIndex { months }))
}

pub async fn daily(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyData>, ApiError> {
    Ok(Json(state.archive.daily(&date).await?))
}
