use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::{info, warn};

use bank_demo_api::api::create_router_with_options;
use bank_demo_api::app::AppState;
use bank_demo_api::config::AppConfig;
use bank_demo_api::infra::{PostgresClient, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv_loaded = dotenv().is_ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format).context("Failed to initialize tracing")?;
    if !dotenv_loaded {
        warn!("No .env file found, using the process environment only");
    }

    let db = PostgresClient::new(config.database_url.expose_secret(), config.postgres())
        .await
        .context("Failed to connect to PostgreSQL")?;
    if config.run_migrations {
        db.run_migrations()
            .await
            .context("Failed to run database migrations")?;
    }

    let addr = config.bind_address();
    let state = Arc::new(AppState::from_store(Arc::new(db)));
    let router = create_router_with_options(state, config.request_timeout, config.rate_limit);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
