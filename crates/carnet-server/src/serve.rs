use crate::config::CarnetConfig;
use crate::http::{create_router, AppState};
use axum::http::HeaderValue;
use carnet_core::{Journal, RedbStorage, Storage};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub async fn run(config: CarnetConfig) -> anyhow::Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "));
    }

    info!("Starting Carnet server v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP: {}", config.server.http_addr);
    info!("Data: {:?}", config.server.data_dir);
    info!("Dangling links on delete: {:?}", config.links.dangling_policy);

    std::fs::create_dir_all(&config.server.data_dir)?;

    info!("Opening database...");
    let storage = RedbStorage::open(config.db_path())?;
    let stats = storage.stats()?;
    info!(
        "Database loaded: {} entries, {} links, {} users",
        stats.entry_count, stats.link_count, stats.user_count
    );

    let state = AppState {
        journal: Journal::new(Arc::new(storage), config.journal_config()),
        palette: Arc::new(config.palette()),
        default_dimensions: config.default_dimensions(),
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state)
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server.http_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Carnet server ready on http://{}", addr);
    info!("Graph: http://{}/graph/viz?user=<uuid>", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, terminating...");
}
