//! Campus Cache - course and student records behind a read-through cache

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_cache::cache::{CacheGateway, MemoryCache, RedisCache};
use campus_cache::store::{DocumentStore, MemoryDocumentStore, MongoDocumentStore};
use campus_cache::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Connect the document store and the cache
/// 4. Start the sweep task when the cache is in-memory
/// 5. Serve HTTP until SIGINT/SIGTERM, then close both connections
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting campus API");

    let config = Config::from_env();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    info!(
        port = config.server_port,
        cache_ttl = config.cache_ttl,
        database = %config.database_name,
        "configuration loaded"
    );

    let store: Arc<dyn DocumentStore> = match &config.mongodb_uri {
        Some(uri) => Arc::new(
            MongoDocumentStore::connect(uri, config.database_name.clone())
                .await
                .context("failed to connect to MongoDB")?,
        ),
        None => {
            warn!("MONGODB_URI not set, records are kept in memory only");
            Arc::new(
                MemoryDocumentStore::connect(config.database_name.clone())
                    .await
                    .context("failed to open in-memory store")?,
            )
        }
    };

    let (cache, sweeper): (Arc<dyn CacheGateway>, Option<JoinHandle<()>>) =
        match &config.redis_uri {
            Some(url) => {
                let redis = RedisCache::connect(url)
                    .await
                    .context("failed to connect to Redis")?;
                (Arc::new(redis), None)
            }
            None => {
                let memory = Arc::new(MemoryCache::new());
                let sweeper = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
                info!("using in-memory cache");
                (memory, Some(sweeper))
            }
        };

    let state = AppState::new(store.clone(), cache.clone(), &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = sweeper {
        handle.abort();
        warn!("Cache sweep task aborted");
    }
    if let Err(e) = store.close().await {
        error!(error = %e, "failed to close document store");
    }
    if let Err(e) = cache.close().await {
        error!(error = %e, "failed to close cache");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
