//! OAuth2 access tokens for the GA4 Data API.

use super::ReportError;
use async_trait::async_trait;
use yup_oauth2::authenticator::{ApplicationDefaultCredentialsTypes, DefaultAuthenticator};
use yup_oauth2::{ApplicationDefaultCredentialsAuthenticator, ApplicationDefaultCredentialsFlowOpts};

/// Read-only scope for the Analytics Data API.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

/// Source of the bearer token attached to each report request.
///
/// Called once per request; implementations cache and refresh as they see fit.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ReportError>;
}

/// A fixed token supplied by the operator. Never refreshed.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ReportError> {
        Ok(self.0.clone())
    }
}

/// Google application default credentials.
///
/// Uses the service account key named by `GOOGLE_APPLICATION_CREDENTIALS` when
/// set, otherwise the GCE metadata server. Tokens are cached by the
/// authenticator and refreshed shortly before they expire.
pub struct DefaultCredentials {
    auth: DefaultAuthenticator,
}

impl DefaultCredentials {
    /// Locate credentials. Fails only when a configured key file is unreadable
    /// or invalid; the metadata server is not contacted until the first token.
    pub async fn discover() -> std::io::Result<Self> {
        let opts = ApplicationDefaultCredentialsFlowOpts::default();
        let auth = match ApplicationDefaultCredentialsAuthenticator::builder(opts).await {
            ApplicationDefaultCredentialsTypes::ServiceAccount(builder) => {
                tracing::info!("Using service account key for GA4 credentials");
                builder.build().await?
            }
            ApplicationDefaultCredentialsTypes::InstanceMetadata(builder) => {
                tracing::info!("Using metadata server for GA4 credentials");
                builder.build().await?
            }
        };
        Ok(Self { auth })
    }
}

#[async_trait]
impl TokenProvider for DefaultCredentials {
    async fn access_token(&self) -> Result<String, ReportError> {
        let token = self
            .auth
            .token(&[ANALYTICS_READONLY_SCOPE])
            .await
            .map_err(|e| ReportError::Credentials(e.to_string()))?;
        token.token().map(str::to_string).ok_or_else(|| {
            ReportError::Credentials("identity provider returned no access token".to_string())
        })
    }
}
