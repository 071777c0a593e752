use ga4_dashboard_api::api::AppState;
use ga4_dashboard_api::config::Config;
use ga4_dashboard_api::ga::client::DataApiClient;
use ga4_dashboard_api::ga::credentials::{DefaultCredentials, StaticToken, TokenProvider};
use ga4_dashboard_api::server;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // A missing .env is normal in production
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ga4_dashboard_api=info,tower_http=info".into());
    if std::env::var("DASHBOARD_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    let mut client = DataApiClient::new(&config.api_base_url);
    match token_provider(&config).await {
        Ok(Some(tokens)) => client = client.with_token_provider(tokens),
        Ok(None) => tracing::warn!(
            "No GA4 credentials configured; report requests will be sent without a token"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load GA4 credentials");
            std::process::exit(1);
        }
    }
    let backend = Arc::new(client);
    let state = match AppState::from_config(&config, backend) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = %config.host,
        port = config.port,
        property_id = %state.property_id,
        api_base_url = %config.api_base_url,
        "Starting GA4 dashboard API"
    );

    let app = server::build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// A fixed token wins; otherwise fall back to application default credentials
/// unless they are disabled.
async fn token_provider(config: &Config) -> std::io::Result<Option<Arc<dyn TokenProvider>>> {
    if let Some(token) = config.static_token() {
        tracing::info!("Using fixed GA4 access token");
        return Ok(Some(Arc::new(StaticToken::new(token))));
    }
    if !config.default_credentials {
        return Ok(None);
    }
    let credentials = DefaultCredentials::discover().await?;
    Ok(Some(Arc::new(credentials)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
