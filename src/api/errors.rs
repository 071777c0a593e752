use crate::ga::ReportError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// API error type with HTTP status code mapping.
///
/// Every variant renders as `{"detail": "<Display output>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// The `days` query parameter is malformed or out of range.
    InvalidDays(String),
    Unauthorized(&'static str),
    /// A report could not be fetched or shaped. The message reaches the
    /// client verbatim; this API is only exposed to the admin.
    Analytics(ReportError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDays(msg) => write!(f, "Invalid days value: {msg}"),
            Self::Unauthorized(msg) => f.write_str(msg),
            Self::Analytics(e) => write!(f, "Analytics error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Analytics(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidDays(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Analytics(e) => {
                tracing::error!(error = %e, "Analytics report failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "detail": self.to_string() });
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        Self::Analytics(e)
    }
}
