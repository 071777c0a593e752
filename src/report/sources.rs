use super::window::DateWindow;
use super::{count, raw_value};
use crate::ga::{fetch_rows, ReportBackend, ReportError, ReportRow};
use serde::Serialize;

/// Maximum number of channel groups reported.
pub const TRAFFIC_SOURCES_LIMIT: usize = 8;

const METRICS: &[&str] = &["sessions", "activeUsers"];
const DIMENSIONS: &[&str] = &["sessionDefaultChannelGroup"];

/// Sessions and users per default channel group, as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrafficSources {
    pub labels: Vec<String>,
    pub sessions: Vec<i64>,
    pub users: Vec<i64>,
}

pub async fn query_traffic_sources(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<TrafficSources, ReportError> {
    let rows = fetch_rows(backend, property_id, window, METRICS, DIMENSIONS).await?;
    shape_sources(&rows)
}

pub fn shape_sources(rows: &[ReportRow]) -> Result<TrafficSources, ReportError> {
    let mut sources = TrafficSources::default();
    for item in rows.iter().take(TRAFFIC_SOURCES_LIMIT) {
        sources
            .labels
            .push(raw_value(item, "sessionDefaultChannelGroup", "(other)").to_string());
        sources.sessions.push(count(item, "sessions")?);
        sources.users.push(count(item, "activeUsers")?);
    }
    Ok(sources)
}
