use super::format::format_duration;
use super::window::DateWindow;
use super::{count, metric, rate, ratio_percent, raw_value};
use crate::ga::{fetch_rows, ReportBackend, ReportError, ReportRow};
use serde::Serialize;

const METRICS: &[&str] = &[
    "totalUsers",
    "newUsers",
    "sessions",
    "engagedSessions",
    "screenPageViews",
    "averageSessionDuration",
    "bounceRate",
    "engagementRate",
    "conversions",
];

/// Headline numbers for the whole window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    pub period_days: u32,
    pub start_date: String,
    pub end_date: String,
    pub total_users: i64,
    pub new_users: i64,
    pub sessions: i64,
    pub engaged_sessions: i64,
    pub page_views: i64,
    pub avg_session_duration: String,
    pub bounce_rate: f64,
    pub engagement_rate: f64,
    pub conversions: i64,
    pub conversion_rate: f64,
}

/// Serializes as the summary, or as `{}` when GA4 returned no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Overview {
    Summary(OverviewSummary),
    Empty {},
}

pub async fn query_overview(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<Overview, ReportError> {
    let rows = fetch_rows(backend, property_id, window, METRICS, &[]).await?;
    shape_overview(&rows, window)
}

/// Only the first row is read; a report without dimensions has at most one.
pub fn shape_overview(rows: &[ReportRow], window: &DateWindow) -> Result<Overview, ReportError> {
    let Some(data) = rows.first() else {
        return Ok(Overview::Empty {});
    };

    let sessions = metric(data, "sessions")?;
    let conversions = metric(data, "conversions")?;

    Ok(Overview::Summary(OverviewSummary {
        period_days: window.days,
        start_date: window.start_date(),
        end_date: window.end_date(),
        total_users: count(data, "totalUsers")?,
        new_users: count(data, "newUsers")?,
        sessions: count(data, "sessions")?,
        engaged_sessions: count(data, "engagedSessions")?,
        page_views: count(data, "screenPageViews")?,
        avg_session_duration: format_duration(raw_value(data, "averageSessionDuration", "0")),
        bounce_rate: rate(data, "bounceRate")?,
        engagement_rate: rate(data, "engagementRate")?,
        conversions: count(data, "conversions")?,
        conversion_rate: ratio_percent(conversions, sessions),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::row;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        DateWindow::ending(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 30).unwrap()
    }

    fn summary(overview: Overview) -> OverviewSummary {
        match overview {
            Overview::Summary(s) => s,
            Overview::Empty {} => panic!("expected a summary"),
        }
    }

    #[test]
    fn test_overview_full_row() {
        let rows = vec![row(&[
            ("totalUsers", "1500"),
            ("newUsers", "900"),
            ("sessions", "2000"),
            ("engagedSessions", "1200"),
            ("screenPageViews", "6400"),
            ("averageSessionDuration", "125.7"),
            ("bounceRate", "0.4"),
            ("engagementRate", "0.6"),
            ("conversions", "50"),
        ])];

        let s = summary(shape_overview(&rows, &window()).unwrap());
        assert_eq!(s.period_days, 30);
        assert_eq!(s.start_date, "2024-02-05");
        assert_eq!(s.end_date, "2024-03-05");
        assert_eq!(s.total_users, 1500);
        assert_eq!(s.new_users, 900);
        assert_eq!(s.sessions, 2000);
        assert_eq!(s.engaged_sessions, 1200);
        assert_eq!(s.page_views, 6400);
        assert_eq!(s.avg_session_duration, "2:05");
        assert!((s.bounce_rate - 40.0).abs() < 1e-9);
        assert!((s.engagement_rate - 60.0).abs() < 1e-9);
        assert_eq!(s.conversions, 50);
        assert!((s.conversion_rate - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_rates_round_to_nearest_tenth() {
        let rows = vec![row(&[
            ("bounceRate", "0.2345"),
            ("engagementRate", "0.1235"),
        ])];
        let s = summary(shape_overview(&rows, &window()).unwrap());
        assert!((s.bounce_rate - 23.4).abs() < 1e-9);
        assert!((s.engagement_rate - 12.3).abs() < 1e-9);
    }

    #[test]
    fn test_conversion_rate_zero_sessions() {
        let rows = vec![row(&[("sessions", "0"), ("conversions", "5")])];
        let s = summary(shape_overview(&rows, &window()).unwrap());
        assert!((s.conversion_rate - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_metrics_default_to_zero() {
        let rows = vec![row(&[])];
        let s = summary(shape_overview(&rows, &window()).unwrap());
        assert_eq!(s.total_users, 0);
        assert_eq!(s.avg_session_duration, "0:00");
        assert!(s.conversion_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_report_serializes_as_empty_object() {
        let overview = shape_overview(&[], &window()).unwrap();
        assert_eq!(overview, Overview::Empty {});
        assert_eq!(serde_json::to_value(&overview).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_summary_uses_camel_case() {
        let rows = vec![row(&[("sessions", "10")])];
        let json = serde_json::to_value(shape_overview(&rows, &window()).unwrap()).unwrap();
        assert_eq!(json["periodDays"], 30);
        assert_eq!(json["pageViews"], 0);
        assert_eq!(json["avgSessionDuration"], "0:00");
    }
}
