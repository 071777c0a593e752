//! HTTP Basic authentication for the admin API.
//!
//! There is exactly one admin account, configured at startup. No sessions or
//! tokens are issued; every request carries its own credentials.

use super::errors::ApiError;
use super::AppState;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

const COMPARE_KEY: &[u8] = b"ga4-dashboard-credential-compare";

/// Username of the caller that passed [`require_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub String);

/// The configured admin username and password.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check both fields in constant time. Both comparisons always run, so
    /// timing does not reveal which one failed.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        username_ok & password_ok
    }
}

/// Compare two byte strings without leaking where (or whether) they differ.
///
/// Both inputs are reduced to HMAC-SHA256 tags under a fixed key and the tags
/// are compared with `verify_slice`, which is constant-time. Hashing first
/// also hides the length of the expected value.
fn constant_time_eq(supplied: &[u8], expected: &[u8]) -> bool {
    let mut expected_mac =
        HmacSha256::new_from_slice(COMPARE_KEY).expect("HMAC accepts any key length");
    expected_mac.update(expected);
    let expected_tag = expected_mac.finalize().into_bytes();

    let mut supplied_mac =
        HmacSha256::new_from_slice(COMPARE_KEY).expect("HMAC accepts any key length");
    supplied_mac.update(supplied);
    supplied_mac.verify_slice(&expected_tag).is_ok()
}

/// Extract `(username, password)` from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized("Not authenticated"))?;

    let (scheme, encoded) = value
        .split_once(' ')
        .ok_or(ApiError::Unauthorized("Not authenticated"))?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(ApiError::Unauthorized("Not authenticated"));
    }

    let invalid = || ApiError::Unauthorized("Invalid authentication credentials");
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (username, password) = decoded.split_once(':').ok_or_else(invalid)?;
    Ok((username.to_string(), password.to_string()))
}

/// Middleware guarding admin routes with HTTP Basic auth.
///
/// On success the verified username is stored as an [`AdminUser`] request
/// extension.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (username, password) = basic_credentials(request.headers())?;
    if !state.credentials.verify(&username, &password) {
        tracing::warn!("Rejected admin credentials");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    request.extensions_mut().insert(AdminUser(username));
    Ok(next.run(request).await)
}
