//! RSVP HTTP server.
//!
//! Event registration with capacity limits, a FIFO waitlist and automatic
//! promotion, backed by `PostgreSQL`.

use anyhow::Context;
use rsvp_core::environment::{SystemClock, UuidIdGenerator};
use rsvp_postgres::PostgresRecordStore;
use rsvp_server::{AppState, Config, build_router, metrics, server::shutdown_signal};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvp_server=info,rsvp_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RSVP HTTP Server");

    // Load configuration
    let config = Config::from_env();
    info!(
        address = %config.server.address(),
        admission_mode = %config.admission_mode,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );

    // Setup record store
    info!("Connecting to database...");
    let store = PostgresRecordStore::connect(&config.database.url, &config.database.pool_config())
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    if config.database.run_migrations {
        store.migrate().await.context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    if config.metrics.enabled {
        metrics::install_exporter(&config.metrics.address())?;
    }

    let state = AppState::new(
        Arc::new(store),
        Arc::new(SystemClock),
        Arc::new(UuidIdGenerator),
        config.admission_mode,
    );
    let app = build_router(state, &config.cors_origins);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "HTTP server listening");

    // Stop accepting on the first signal, then give in-flight requests
    // `shutdown_timeout` seconds to finish.
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let drain_deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result.context("HTTP server failed")?,
        () = drain_deadline => {
            warn!(timeout_secs = config.server.shutdown_timeout, "Graceful shutdown timed out");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
