//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, worker spawning, and Axum server lifecycle.

use crate::application::QueryFacade;
use crate::application::click_worker::run_click_worker;
use crate::application::services::AuthService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::memory::{MemoryClickRepository, MemoryLinkRepository};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository, run_migrations};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// How long queued clicks may take to drain after the listener stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The two repositories backing a [`QueryFacade`].
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
}

/// Opens a PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds the repositories for the configured storage backend.
///
/// The PostgreSQL backend connects and applies pending migrations first.
pub async fn open_repositories(config: &Config) -> Result<Repositories> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories {
                links: Arc::new(MemoryLinkRepository::new()),
                clicks: Arc::new(MemoryClickRepository::new()),
            })
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            let pool = Arc::new(pool);
            Ok(Repositories {
                links: Arc::new(PgLinkRepository::new(pool.clone())),
                clicks: Arc::new(PgClickRepository::new(pool)),
            })
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (and migrations for PostgreSQL)
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the listener stops first, then the click worker gets
/// [`WORKER_DRAIN_TIMEOUT`] to process clicks still in the queue.
///
/// # Errors
///
/// Returns an error if:
/// - Storage initialization fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repositories = open_repositories(&config).await?;

    let facade = Arc::new(QueryFacade::new(
        repositories.links,
        repositories.clicks,
        config.dedup_window(),
        config.analytics_settings()?,
    ));
    let auth_service = Arc::new(AuthService::new(config.token_signing_secret.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(click_rx, facade.click_service()));
    tracing::info!("Click worker started");

    let state = AppState::new(facade, auth_service, click_tx);
    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router held the last senders; the worker now drains and exits.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker panicked"),
        Err(_) => tracing::warn!(
            timeout_secs = WORKER_DRAIN_TIMEOUT.as_secs(),
            "Click queue not drained before shutdown"
        ),
    }

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
