use super::format::format_duration;
use super::window::DateWindow;
use super::{count, rate, raw_value};
use crate::ga::{fetch_rows, ReportBackend, ReportError, ReportRow};
use serde::Serialize;

/// Maximum number of pages reported.
pub const TOP_PAGES_LIMIT: usize = 10;

const METRICS: &[&str] = &[
    "screenPageViews",
    "averageSessionDuration",
    "bounceRate",
    "engagedSessions",
];
const DIMENSIONS: &[&str] = &["pagePath"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub page: String,
    pub views: i64,
    pub avg_time: String,
    pub bounce_rate: f64,
    pub engaged_sessions: i64,
}

pub async fn query_top_pages(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
) -> Result<Vec<TopPage>, ReportError> {
    let rows = fetch_rows(backend, property_id, window, METRICS, DIMENSIONS).await?;
    shape_top_pages(&rows)
}

/// Keeps GA4's row order; no re-ranking is applied.
pub fn shape_top_pages(rows: &[ReportRow]) -> Result<Vec<TopPage>, ReportError> {
    rows.iter()
        .take(TOP_PAGES_LIMIT)
        .map(|item| -> Result<TopPage, ReportError> {
            Ok(TopPage {
                page: raw_value(item, "pagePath", "(not set)").to_string(),
                views: count(item, "screenPageViews")?,
                avg_time: format_duration(raw_value(item, "averageSessionDuration", "0")),
                bounce_rate: rate(item, "bounceRate")?,
                engaged_sessions: count(item, "engagedSessions")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::row;

    #[test]
    fn test_page_fields() {
        let rows = vec![row(&[
            ("pagePath", "/pricing"),
            ("screenPageViews", "321"),
            ("averageSessionDuration", "75"),
            ("bounceRate", "0.125"),
            ("engagedSessions", "99"),
        ])];
        let pages = shape_top_pages(&rows).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, "/pricing");
        assert_eq!(pages[0].views, 321);
        assert_eq!(pages[0].avg_time, "1:15");
        assert!((pages[0].bounce_rate - 12.5).abs() < 1e-9);
        assert_eq!(pages[0].engaged_sessions, 99);
    }

    #[test]
    fn test_truncated_to_limit_in_backend_order() {
        let rows: Vec<_> = (0..15)
            .map(|i| {
                let path = format!("/p{i}");
                row(&[("pagePath", path.as_str()), ("screenPageViews", "1")])
            })
            .collect();
        let pages = shape_top_pages(&rows).unwrap();
        assert_eq!(pages.len(), TOP_PAGES_LIMIT);
        assert_eq!(pages[0].page, "/p0");
        assert_eq!(pages[9].page, "/p9");
    }

    #[test]
    fn test_missing_path_is_not_set() {
        let pages = shape_top_pages(&[row(&[])]).unwrap();
        assert_eq!(pages[0].page, "(not set)");
        assert_eq!(pages[0].avg_time, "0:00");
    }

    #[test]
    fn test_rows_past_limit_are_not_parsed() {
        let mut rows: Vec<_> = (0..TOP_PAGES_LIMIT)
            .map(|_| row(&[("screenPageViews", "1")]))
            .collect();
        rows.push(row(&[("screenPageViews", "garbage")]));
        assert_eq!(shape_top_pages(&rows).unwrap().len(), TOP_PAGES_LIMIT);
    }
}
