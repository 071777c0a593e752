use super::count;
use super::format::format_date_label;
use super::window::DateWindow;
use crate::ga::{fetch_rows, ReportBackend, ReportError, ReportRow};
use serde::Serialize;

const METRICS: &[&str] = &["activeUsers", "sessions", "screenPageViews", "engagedSessions"];
const DIMENSIONS: &[&str] = &["date"];

/// Daily series as parallel arrays, ready for a chart library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSeries {
    pub labels: Vec<String>,
    pub active_users: Vec<i64>,
    pub sessions: Vec<i64>,
    pub page_views: Vec<i64>,
    pub engaged_sessions: Vec<i64>,
}

pub async fn query_traffic_over_time(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<TrafficSeries, ReportError> {
    let rows = fetch_rows(backend, property_id, window, METRICS, DIMENSIONS).await?;
    shape_traffic(rows)
}

/// Sort rows chronologically by their raw `YYYYMMDD` value and split them
/// into parallel series.
pub fn shape_traffic(mut rows: Vec<ReportRow>) -> Result<TrafficSeries, ReportError> {
    rows.sort_by(|a, b| raw_date(a).cmp(raw_date(b)));

    let mut series = TrafficSeries::default();
    for row in &rows {
        series.labels.push(format_date_label(raw_date(row)));
        series.active_users.push(count(row, "activeUsers")?);
        series.sessions.push(count(row, "sessions")?);
        series.page_views.push(count(row, "screenPageViews")?);
        series.engaged_sessions.push(count(row, "engagedSessions")?);
    }
    Ok(series)
}

fn raw_date(row: &ReportRow) -> &str {
    super::raw_value(row, "date", "")
}
