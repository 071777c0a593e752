pub mod analytics;
pub mod auth;
pub mod errors;

use crate::config::{Config, ConfigError};
use crate::ga::ReportBackend;
use auth::AdminCredentials;
use std::sync::Arc;

/// Shared, read-only application state.
pub struct AppState {
    pub credentials: AdminCredentials,
    /// GA4 property id, without the `properties/` prefix.
    pub property_id: String,
    pub backend: Arc<dyn ReportBackend>,
}

impl AppState {
    pub fn new(
        credentials: AdminCredentials,
        property_id: impl Into<String>,
        backend: Arc<dyn ReportBackend>,
    ) -> Self {
        Self {
            credentials,
            property_id: property_id.into(),
            backend,
        }
    }

    /// Build the state from loaded configuration, failing if any required
    /// setting is missing so the server never starts half-configured.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn ReportBackend>,
    ) -> Result<Self, ConfigError> {
        let credentials = AdminCredentials::new(config.admin_username()?, config.admin_password()?);
        Ok(Self::new(credentials, config.property_id()?, backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{ReportError, RunReportRequest, RunReportResponse};
    use async_trait::async_trait;

    struct NoBackend;

    #[async_trait]
    impl ReportBackend for NoBackend {
        async fn run_report(
            &self,
            _request: &RunReportRequest,
        ) -> Result<RunReportResponse, ReportError> {
            Ok(RunReportResponse::default())
        }
    }

    fn full_config() -> Config {
        Config {
            admin_username: Some("admin".to_string()),
            admin_password: Some("pw".to_string()),
            property_id: Some("123".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_from_config() {
        let state = AppState::from_config(&full_config(), Arc::new(NoBackend)).unwrap();
        assert_eq!(state.property_id, "123");
        assert!(state.credentials.verify("admin", "pw"));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config {
            admin_username: None,
            ..full_config()
        };
        let err = AppState::from_config(&config, Arc::new(NoBackend)).err();
        assert_eq!(err, Some(ConfigError::Missing("ADMIN_USERNAME")));
    }

    #[test]
    fn test_from_config_requires_property() {
        let config = Config {
            property_id: Some(String::new()),
            ..full_config()
        };
        let err = AppState::from_config(&config, Arc::new(NoBackend)).err();
        assert_eq!(err, Some(ConfigError::Missing("GA4_PROPERTY_ID")));
    }
}
