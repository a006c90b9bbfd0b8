use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{Level, error, info, warn};

use financegram_backend::{
    api::{AppState, MiddlewareConfig, create_app},
    auth::TokenIssuer,
    config::{AppConfig, sanitize_database_url, sanitize_for_logging},
    database::{DatabasePool, MemoryStore, Store},
    ingestion::IngestionScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        e
    })?;

    init_logging(&config)?;

    info!("Starting Financegram backend");
    if config.uses_dev_secret() {
        warn!("Signing tokens with the development secret; set JWT_SECRET in production");
    } else {
        info!(
            "Token secret: {}",
            sanitize_for_logging(&config.auth.jwt_secret)
        );
    }

    let store = open_store(&config).await?;

    let scheduler = IngestionScheduler::new(Arc::clone(&store), config.ingestion_period());
    let startup = scheduler.run_cycle().await;
    if !startup.is_clean() {
        error!(
            failed_domains = ?startup.failed_domains(),
            failures = startup.total_failures(),
            "Startup ingestion failed"
        );
        store.close().await;
        anyhow::bail!("startup ingestion cycle failed");
    }

    let tokens = TokenIssuer::new(config.auth.jwt_secret.as_bytes(), config.token_ttl());
    let middleware_config = MiddlewareConfig {
        max_request_size: config.security.max_request_size,
        log_requests: config.logging.log_requests,
        sanitize_logs: config.logging.sanitize_logs,
    };
    let app = create_app(
        AppState::new(Arc::clone(&store), tokens),
        middleware_config,
        config.security.enable_cors,
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let scheduler_handle = scheduler.spawn(shutdown_rx);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(
        "Financegram backend listening on {} (ingestion every {}s)",
        bind_addr, config.ingestion.interval_secs
    );

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    // The scheduler finishes a cycle in progress before stopping
    let _ = shutdown_tx.send(());
    if let Err(e) = scheduler_handle.await {
        warn!(error = %e, "Ingestion scheduler did not stop cleanly");
    }
    store.close().await;
    info!("Shutdown complete");

    served.context("HTTP server error")
}

/// PostgreSQL when a URL is configured, otherwise the in-memory store.
async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match &config.database.url {
        Some(url) => {
            info!("Connecting to {}", sanitize_database_url(url));
            let pool = DatabasePool::connect(url, config.database.max_connections)
                .await
                .context("Failed to connect to database")?;
            pool.init_schema()
                .await
                .context("Failed to initialize database schema")?;
            info!("Database ready");
            Ok(Arc::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, content and accounts are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_level = match config.logging.level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt().with_max_level(log_level).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
