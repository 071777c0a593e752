use super::window::DateWindow;
use super::{ratio_percent, raw_value, whole};
use crate::ga::{fetch_rows, ReportBackend, ReportError, ReportRow};
use serde::Serialize;

const METRICS: &[&str] = &["activeUsers"];
const DIMENSIONS: &[&str] = &["deviceCategory"];

const LABELS: [&str; 3] = ["Desktop", "Mobile", "Tablet"];
const COLORS: [&str; 3] = ["#3b82f6", "#10b981", "#8b5cf6"];

/// Share of active users per device class, in percent.
///
/// Users in any other category (smart TVs, consoles, unknown) count toward the
/// total but get no bucket of their own, so the three percentages may sum to
/// less than 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceBreakdown {
    pub labels: [&'static str; 3],
    pub data: [f64; 3],
    pub colors: [&'static str; 3],
}

pub async fn query_device_breakdown(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<DeviceBreakdown, ReportError> {
    let rows = fetch_rows(backend, property_id, window, METRICS, DIMENSIONS).await?;
    shape_devices(&rows)
}

pub fn shape_devices(rows: &[ReportRow]) -> Result<DeviceBreakdown, ReportError> {
    // Accumulated as floats; integer sums of large counts can overflow
    let mut buckets = [0.0_f64; 3];
    let mut total = 0.0_f64;

    for item in rows {
        let users = whole(item, "activeUsers")?;
        let slot = match raw_value(item, "deviceCategory", "other")
            .to_lowercase()
            .as_str()
        {
            "desktop" => Some(0),
            "mobile" => Some(1),
            "tablet" => Some(2),
            _ => None,
        };
        if let Some(i) = slot {
            buckets[i] += users;
        }
        total += users;
    }

    let data = buckets.map(|users| ratio_percent(users, total));

    Ok(DeviceBreakdown {
        labels: LABELS,
        data,
        colors: COLORS,
    })
}
