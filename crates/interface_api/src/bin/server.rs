//! Tienda API Server Binary
//!
//! Starts the HTTP API for the credit ledger and the daily cash register.
//!
//! # Usage
//!
//! ```bash
//! APP_DATABASE_URL=postgres://... APP_LOG_FORMAT=json cargo run --bin tienda-api
//! ```
//!
//! # Environment Variables
//!
//! * `APP_HOST` / `APP_PORT` - Bind address (default: 0.0.0.0:8080)
//! * `APP_DATABASE_URL` - PostgreSQL connection string
//! * `APP_DB_MAX_CONNECTIONS` / `APP_DB_MIN_CONNECTIONS` - Pool sizing
//! * `APP_LOG_LEVEL` - `EnvFilter` directive (default: info; `RUST_LOG` wins)
//! * `APP_LOG_FORMAT` - `plain` or `json`
//! * `APP_TIMEZONE` - Store timezone (default: America/Mexico_City)
//! * `APP_NEAR_LIMIT_THRESHOLD` - Near-limit warning fraction (default: 0.8)
//! * `APP_NOTIFICATION_TIMEOUT_MS` - Per-notification bound (default: 5000)
//! * `APP_DEFAULT_OPERATOR` - Operator when `x-operator` is absent (default: Admin)

use std::net::SocketAddr;

use anyhow::Context;
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid APP_* configuration")?;
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting Tienda API Server"
    );

    let pool = infra_db::create_pool(config.database_config())
        .await
        .context("failed to connect to database")?;
    infra_db::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server_addr()))?;
    let state = AppState::with_postgres(pool, config).context("invalid store timezone")?;
    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = (config.log_format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let plain_layer = (config.log_format == LogFormat::Plain)
        .then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
