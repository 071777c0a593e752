use crate::ga::client::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use std::path::Path;

/// Application configuration loaded from a TOML file and environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Admin username for HTTP Basic auth. Required.
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Admin password for HTTP Basic auth. Required.
    #[serde(default)]
    pub admin_password: Option<String>,
    /// Numeric GA4 property id, without the `properties/` prefix. Required.
    #[serde(default)]
    pub property_id: Option<String>,
    /// Base URL of the GA4 Data API. Overridable for proxies and tests.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Fixed OAuth2 access token. Takes precedence over default credentials
    /// and is never refreshed.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Mint tokens from Google application default credentials when no fixed
    /// token is set. Disable for proxies that inject credentials themselves.
    #[serde(default = "default_true")]
    pub default_credentials: bool,
}

/// A required setting is absent or blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "required setting {var} is not set"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_username: None,
            admin_password: None,
            property_id: None,
            api_base_url: default_api_base_url(),
            access_token: None,
            default_credentials: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `DASHBOARD_HOST` → host
    /// - `DASHBOARD_PORT` → port
    /// - `ADMIN_USERNAME` → admin_username
    /// - `ADMIN_PASSWORD` → admin_password
    /// - `GA4_PROPERTY_ID` → property_id
    /// - `GA4_API_BASE_URL` → api_base_url
    /// - `GA4_ACCESS_TOKEN` → access_token
    /// - `GA4_DEFAULT_CREDENTIALS` → default_credentials
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        if let Ok(host) = std::env::var("DASHBOARD_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("DASHBOARD_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(user) = std::env::var("ADMIN_USERNAME") {
            config.admin_username = Some(user);
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            config.admin_password = Some(password);
        }
        if let Ok(id) = std::env::var("GA4_PROPERTY_ID") {
            config.property_id = Some(id);
        }
        if let Ok(url) = std::env::var("GA4_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(token) = std::env::var("GA4_ACCESS_TOKEN") {
            config.access_token = Some(token);
        }
        if let Ok(flag) = std::env::var("GA4_DEFAULT_CREDENTIALS") {
            if let Ok(enabled) = flag.parse() {
                config.default_credentials = enabled;
            }
        }

        config
    }

    pub fn admin_username(&self) -> Result<&str, ConfigError> {
        required(self.admin_username.as_deref(), "ADMIN_USERNAME")
    }

    pub fn admin_password(&self) -> Result<&str, ConfigError> {
        required(self.admin_password.as_deref(), "ADMIN_PASSWORD")
    }

    pub fn property_id(&self) -> Result<&str, ConfigError> {
        required(self.property_id.as_deref(), "GA4_PROPERTY_ID")
    }

    /// The fixed access token, if one is set and not blank.
    pub fn static_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// `Config::load` reads process-wide environment variables; tests that
    /// call it or mutate the environment hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.api_base_url, "https://analyticsdata.googleapis.com");
        assert!(config.admin_username.is_none());
        assert!(config.admin_password.is_none());
        assert!(config.property_id.is_none());
        assert!(config.access_token.is_none());
        assert!(config.default_credentials);
    }

    #[test]
    fn test_load_from_toml() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"
host = "127.0.0.1"
port = 9000
admin_username = "admin"
admin_password = "hunter2"
property_id = "123456789"
api_base_url = "http://localhost:8085"
access_token = "ya29.token"
default_credentials = false
"#
        )
        .unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.admin_username.as_deref(), Some("admin"));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.property_id.as_deref(), Some("123456789"));
        assert_eq!(config.api_base_url, "http://localhost:8085");
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
        assert!(!config.default_credentials);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_toml_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "this is not valid toml {{{").unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_env_var_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();

        let orig_port = std::env::var("DASHBOARD_PORT").ok();
        let orig_property = std::env::var("GA4_PROPERTY_ID").ok();

        std::env::set_var("DASHBOARD_PORT", "3000");
        std::env::set_var("GA4_PROPERTY_ID", "987");
        let config = Config::load(None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.property_id.as_deref(), Some("987"));

        match orig_port {
            Some(v) => std::env::set_var("DASHBOARD_PORT", v),
            None => std::env::remove_var("DASHBOARD_PORT"),
        }
        match orig_property {
            Some(v) => std::env::set_var("GA4_PROPERTY_ID", v),
            None => std::env::remove_var("GA4_PROPERTY_ID"),
        }
    }

    #[test]
    fn test_required_settings() {
        let config = Config {
            admin_username: Some("admin".to_string()),
            admin_password: Some("   ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.admin_username(), Ok("admin"));
        assert_eq!(
            config.admin_password(),
            Err(ConfigError::Missing("ADMIN_PASSWORD"))
        );
        assert_eq!(
            config.property_id(),
            Err(ConfigError::Missing("GA4_PROPERTY_ID"))
        );
    }

    #[test]
    fn test_static_token_ignores_blank() {
        let mut config = Config::default();
        assert_eq!(config.static_token(), None);
        config.access_token = Some("  ".to_string());
        assert_eq!(config.static_token(), None);
        config.access_token = Some("ya29.token".to_string());
        assert_eq!(config.static_token(), Some("ya29.token"));
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::Missing("ADMIN_USERNAME").to_string(),
            "required setting ADMIN_USERNAME is not set"
        );
    }
}
