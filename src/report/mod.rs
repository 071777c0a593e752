//! Shaping of raw GA4 report rows into the dashboard payload.
//!
//! Each submodule issues one report with a fixed metric/dimension set and
//! converts the flattened rows into a serializable aggregate.

pub mod devices;
pub mod format;
pub mod overview;
pub mod pages;
pub mod sources;
pub mod traffic;
pub mod window;

use crate::ga::{ReportBackend, ReportError, ReportRow};
use serde::Serialize;
use window::DateWindow;

/// The `data` object of a successful analytics response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub overview: overview::Overview,
    pub traffic_over_time: traffic::TrafficSeries,
    pub top_pages: Vec<pages::TopPage>,
    pub device_category: devices::DeviceBreakdown,
    pub traffic_sources: sources::TrafficSources,
}

/// Run all five reports for `window` and assemble the dashboard data.
///
/// The reports are independent, so they are issued concurrently. The first
/// failure aborts the whole build; no partial data is returned.
pub async fn build_report(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<AnalyticsData, ReportError> {
    let (overview, traffic_over_time, top_pages, device_category, traffic_sources) =
        tokio::try_join!(
            overview::query_overview(backend, property_id, window),
            traffic::query_traffic_over_time(backend, property_id, window),
            pages::query_top_pages(backend, property_id, window),
            devices::query_device_breakdown(backend, property_id, window),
            sources::query_traffic_sources(backend, property_id, window),
        )?;

    Ok(AnalyticsData {
        overview,
        traffic_over_time,
        top_pages,
        device_category,
        traffic_sources,
    })
}

/// Read a metric as a float. A missing key reads as 0.
fn metric(row: &ReportRow, key: &str) -> Result<f64, ReportError> {
    let Some(raw) = row.get(key) else {
        return Ok(0.0);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ReportError::Malformed(format!(
            "metric '{key}' is not a number: {raw:?}"
        ))),
    }
}

/// Read a metric with any fractional part truncated, still as a float.
fn whole(row: &ReportRow, key: &str) -> Result<f64, ReportError> {
    Ok(metric(row, key)?.trunc())
}

/// Read a count-like metric, truncating any fractional part.
///
/// A value outside the `i64` range is malformed rather than clamped.
fn count(row: &ReportRow, key: &str) -> Result<i64, ReportError> {
    let value = whole(row, key)?;
    #[allow(clippy::cast_precision_loss)]
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&value);
    if !in_range {
        return Err(ReportError::Malformed(format!(
            "metric '{key}' is out of range: {value}"
        )));
    }
    #[allow(clippy::cast_possible_truncation)]
    let n = value as i64;
    Ok(n)
}

/// Read a rate-like metric (a 0..1 fraction) as a percentage with one decimal.
fn rate(row: &ReportRow, key: &str) -> Result<f64, ReportError> {
    Ok(round1(metric(row, key)? * 100.0))
}

/// `numerator / max(denominator, 1)` as a percentage with one decimal.
fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    round1(numerator / denominator.max(1.0) * 100.0)
}

/// Round to one decimal place, ties to even on the exact binary value.
///
/// Scaling by 10 first would introduce a second rounding step, so this goes
/// through the formatter, which rounds the exact value.
fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Raw string value of a field, or `fallback` when the key is missing.
fn raw_value<'a>(row: &'a ReportRow, key: &str, fallback: &'a str) -> &'a str {
    row.get(key).map_or(fallback, String::as_str)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ga::ReportRow;

    /// Build a row from `(field, value)` pairs.
    pub fn row(pairs: &[(&str, &str)]) -> ReportRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}
