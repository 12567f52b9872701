mod handlers;
mod models;
mod routes;
mod state;
mod validation;

use bazaar::catalog::{SledCatalog, seed_demo_catalog};
use bazaar::popularity::SledPopularity;
use bazaar::ports::PopularityStore;
use bazaar::search::{SearchService, SearchTunables};
use shared::config::Config;
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Bazaar search server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    let db = sled::open(&config.data_dir).expect("Failed to open database");

    let popularity: Arc<dyn PopularityStore> = Arc::new(SledPopularity::new(db.clone()));
    let catalog = SledCatalog::new(db.clone(), popularity.clone());

    if config.seed_catalog {
        match catalog.is_empty() {
            Ok(true) => match seed_demo_catalog(&catalog) {
                Ok(count) => info!("Seeded demo catalog with {} products", count),
                Err(e) => warn!("Demo catalog seeding failed: {}", e),
            },
            Ok(false) => info!("Catalog already populated, skipping seed"),
            Err(e) => warn!("Could not inspect catalog for seeding: {}", e),
        }
    }

    let cache = storage_engine::store_from_config(&config, &db);
    info!("Cache store backend: {}", config.cache_backend.name());

    let tunables = SearchTunables {
        results_ttl: config.results_ttl,
        suggestions_ttl: config.suggestions_ttl,
        cache_op_timeout: Duration::from_millis(config.cache_op_timeout_ms),
        query_timeout: Duration::from_millis(config.query_timeout_ms),
    };
    let search = Arc::new(SearchService::new(
        cache.clone(),
        Arc::new(catalog.clone()),
        popularity.clone(),
        tunables,
    ));

    let sweeper = storage_engine::spawn_sweeper(
        cache.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let state = AppState::new(search, cache, catalog, popularity);
    let router = routes::build_router(state, &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind HTTP listener");

    info!("HTTP Server listening on http://{}", addr);
    info!("Try: curl 'http://{}/search?q=headphones'", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server error");

    sweeper.abort();
    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
