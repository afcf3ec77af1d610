mod config;
mod errors;
mod format;
mod models;
mod routes;
mod salesforce;
mod service;
mod store;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::routes::api_routes;
use crate::salesforce::SalesforceClient;
use crate::service::case_service::CaseService;
use crate::service::token_cache::TokenCache;
use crate::store::{EdgeConfigStore, MemoryTokenStore, TokenStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_case_service=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // ── Token store ───────────────────────────────────────────────────────────
    let store: Arc<dyn TokenStore> = match config.edge_config {
        Some(settings) => {
            info!("Using edge-config token store");
            Arc::new(EdgeConfigStore::new(
                settings.config_id,
                settings.read_token,
                settings.api_token,
                settings.team_id,
            ))
        }
        None => {
            info!(
                "Using in-memory token store (set EDGE_CONFIG_ID, EDGE_CONFIG_READ_TOKEN \
                 and VERCEL_API_TOKEN to share tokens across instances)"
            );
            Arc::new(MemoryTokenStore::new())
        }
    };

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let salesforce = SalesforceClient::new(
        &config.salesforce_domain,
        config.salesforce_client_id,
        config.salesforce_client_secret,
        config.salesforce_username,
        config.salesforce_password,
        config.salesforce_security_token,
    );
    let token_cache = TokenCache::new(store, salesforce.clone());
    let case_service = CaseService::new(token_cache, salesforce, config.chat_preview_root);

    // ── Router ────────────────────────────────────────────────────────────────
    let app = api_routes::router(case_service).layer(TraceLayer::new_for_http());

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
