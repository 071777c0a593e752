use super::credentials::TokenProvider;
use super::{ReportBackend, ReportError, RunReportRequest, RunReportResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Default host of the GA4 Data API.
pub const DEFAULT_API_BASE_URL: &str = "https://analyticsdata.googleapis.com";

/// HTTP client for the GA4 Data API `v1beta` surface.
///
/// Requests are sent as JSON to `{base_url}/v1beta/{property}:runReport`. With
/// a token provider attached, a fresh bearer token is requested for every
/// call; without one the request goes out unauthenticated, which only works
/// against a local proxy or emulator that injects credentials itself.
#[derive(Clone)]
pub struct DataApiClient {
    client: Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl DataApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: None,
        }
    }

    #[must_use]
    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    fn report_url(&self, property: &str) -> String {
        format!("{}/v1beta/{property}:runReport", self.base_url)
    }
}

#[async_trait]
impl ReportBackend for DataApiClient {
    async fn run_report(
        &self,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse, ReportError> {
        let mut builder = self.client.post(self.report_url(&request.property)).json(request);
        if let Some(tokens) = &self.tokens {
            builder = builder.bearer_auth(tokens.access_token().await?);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<RunReportResponse>().await.map_err(|e| {
            ReportError::Malformed(format!("could not decode runReport response: {e}"))
        })
    }
}
