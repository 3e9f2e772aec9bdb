use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bistro_gateway::auth::TokenCodec;
use bistro_gateway::config::{AppConfig, SecurityConfig, StoreBackend};
use bistro_gateway::database::{models::ensure_admin, DocumentStore, MemoryStore, PgDocumentStore};
use bistro_gateway::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up ACCESS_SECRET_TOKEN, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bistro_gateway=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting bistro gateway in {:?} mode", config.environment);

    let codec = Arc::new(
        TokenCodec::new(&config.security.access_secret, config.security.token_ttl())
            .context("failed to initialise token codec")?,
    );
    info!(
        secret_fingerprint = codec.fingerprint(),
        ttl_hours = codec.ttl().num_hours(),
        "Token codec ready"
    );

    let mut pg_store = None;
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory document store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pg = Arc::new(
                PgDocumentStore::connect(
                    url,
                    config.store.max_connections,
                    Duration::from_secs(config.store.connection_timeout_secs),
                )
                .await
                .context("failed to connect document store")?,
            );
            pg_store = Some(pg.clone());
            pg
        }
    };

    if let Some(email) = &config.store.bootstrap_admin {
        ensure_admin(store.as_ref(), email)
            .await
            .with_context(|| format!("failed to bootstrap admin {}", email))?;
    }

    let state = AppState::new(codec, store, config.store.lookup_timeout());
    let mut router = app(state).layer(TraceLayer::new_for_http());
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Bistro gateway listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pg) = pg_store {
        pg.close().await;
    }
    info!("Bistro gateway stopped");
    Ok(())
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
