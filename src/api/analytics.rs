use super::auth::AdminUser;
use super::errors::ApiError;
use super::AppState;
use crate::report::window::{DateWindow, MAX_DAYS, MIN_DAYS};
use crate::report::{self, AnalyticsData};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Look-back used when `days` is not supplied.
pub const DEFAULT_DAYS: i64 = 30;

/// Query parameters for `GET /analytics`.
///
/// `days` is taken as text so that malformed values get the same 400 body as
/// out-of-range ones.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<String>,
}

/// Body of a successful `GET /analytics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub status: &'static str,
    pub days: u32,
    pub start_date: String,
    pub end_date: String,
    pub data: AnalyticsData,
    /// Local time the payload was generated, ISO-8601 with microseconds.
    pub timestamp: String,
}

/// Resolve the reporting window from the raw `days` parameter.
pub fn resolve_window(days: Option<&str>, today: NaiveDate) -> Result<DateWindow, ApiError> {
    let days = match days.map(str::trim) {
        None => DEFAULT_DAYS,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidDays(format!("'{raw}' is not a whole number")))?,
    };
    DateWindow::ending(today, days).ok_or_else(|| {
        ApiError::InvalidDays(format!(
            "{days} is outside the allowed range {MIN_DAYS}..={MAX_DAYS}"
        ))
    })
}

/// GET /analytics — the full dashboard payload for the last `days` days.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidDays(e.body_text()))?;
    let window = resolve_window(params.days.as_deref(), Local::now().date_naive())?;

    let data = report::build_report(state.backend.as_ref(), &state.property_id, &window).await?;

    tracing::info!(
        admin = %admin.0,
        days = window.days,
        start_date = %window.start,
        end_date = %window.end,
        "Analytics report served"
    );

    Ok(Json(AnalyticsResponse {
        status: "success",
        days: window.days,
        start_date: window.start_date(),
        end_date: window.end_date(),
        data,
        timestamp: Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    }))
}
