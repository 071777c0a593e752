use crate::api::{analytics, auth, AppState};
use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/analytics", get(analytics::get_analytics))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(admin_routes)
        .layer(axum::middleware::map_response(add_security_headers))
        .layer(build_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin, method and header, with credentials.
///
/// A literal `*` is not allowed together with credentials, so the request's
/// own origin, method and headers are echoed back instead.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Inject OWASP-recommended security headers on every HTTP response.
async fn add_security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response
}

/// GET /health — Simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
