//! Google Analytics 4 Data API access.
//!
//! The wire types mirror the `runReport` REST resource so the production
//! client can send them as-is, while [`ReportBackend`] lets tests substitute
//! canned responses.

pub mod client;
pub mod credentials;

use crate::report::window::DateWindow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A flattened report row: dimension and metric header names mapped to raw values.
pub type ReportRow = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// A metric or dimension reference; both serialize as `{"name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
}

/// Body of `POST /v1beta/{property}:runReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    /// `properties/<id>`; part of the URL, not the body.
    #[serde(skip)]
    pub property: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Field>,
}

impl RunReportRequest {
    pub fn new(
        property_id: &str,
        window: &DateWindow,
        metrics: &[&str],
        dimensions: &[&str],
    ) -> Self {
        Self {
            property: format!("properties/{property_id}"),
            date_ranges: vec![DateRange {
                start_date: window.start_date(),
                end_date: window.end_date(),
            }],
            metrics: metrics
                .iter()
                .map(|m| Field {
                    name: (*m).to_string(),
                })
                .collect(),
            dimensions: dimensions
                .iter()
                .map(|d| Field {
                    name: (*d).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<Value>,
    #[serde(default)]
    pub metric_values: Vec<Value>,
}

/// The subset of the `runReport` response this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub dimension_headers: Vec<Header>,
    #[serde(default)]
    pub metric_headers: Vec<Header>,
    /// Absent from the JSON when the report is empty.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Failure while fetching or interpreting a report.
#[derive(Debug)]
pub enum ReportError {
    Transport(reqwest::Error),
    Upstream { status: u16, body: String },
    Malformed(String),
    /// No access token could be obtained for the request.
    Credentials(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request to analytics backend failed: {e}"),
            Self::Upstream { status, body } => {
                write!(f, "analytics backend returned {status}: {body}")
            }
            Self::Malformed(msg) => write!(f, "malformed report: {msg}"),
            Self::Credentials(msg) => write!(f, "could not obtain access token: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

/// Anything that can execute a `runReport` call.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    async fn run_report(
        &self,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse, ReportError>;
}

/// Run one report and flatten every row into a [`ReportRow`].
///
/// Dimension values are inserted before metric values, so a metric wins if a
/// header name appears in both. Backend row order is preserved.
pub async fn fetch_rows(
    backend: &dyn ReportBackend,
    property_id: &str,
    window: &DateWindow,
    metrics: &[&str],
    dimensions: &[&str],
) -> Result<Vec<ReportRow>, ReportError> {
    let request = RunReportRequest::new(property_id, window, metrics, dimensions);
    let response = backend.run_report(&request).await?;
    tracing::debug!(
        metrics = ?metrics,
        dimensions = ?dimensions,
        rows = response.rows.len(),
        "Report fetched"
    );
    flatten_rows(&response, !dimensions.is_empty())
}

fn flatten_rows(
    response: &RunReportResponse,
    with_dimensions: bool,
) -> Result<Vec<ReportRow>, ReportError> {
    response
        .rows
        .iter()
        .map(|row| {
            let mut item = ReportRow::new();
            if with_dimensions {
                insert_values(
                    &mut item,
                    &response.dimension_headers,
                    &row.dimension_values,
                    "dimension",
                )?;
            }
            insert_values(
                &mut item,
                &response.metric_headers,
                &row.metric_values,
                "metric",
            )?;
            Ok(item)
        })
        .collect()
}

fn insert_values(
    item: &mut ReportRow,
    headers: &[Header],
    values: &[Value],
    kind: &str,
) -> Result<(), ReportError> {
    for (i, value) in values.iter().enumerate() {
        let header = headers.get(i).ok_or_else(|| {
            ReportError::Malformed(format!(
                "row has {} {kind} values but only {} {kind} headers",
                values.len(),
                headers.len()
            ))
        })?;
        item.insert(header.name.clone(), value.value.clone());
    }
    Ok(())
}
