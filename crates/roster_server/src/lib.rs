//! HTTP server for the Roster user directory.
//!
//! # Responsibility
//! - Wire configuration, logging and storage into the axum router.
//! - Serve until SIGINT/SIGTERM, then drain in-flight requests.

pub mod api;
pub mod config;

use api::{router, AppState};
use config::ServerConfig;
use log::{info, warn};
use roster_core::db::{DbLocation, SharedDb};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server stopped with error: {0}")]
    Serve(std::io::Error),
}

/// Starts file logging when a directory is configured, stderr otherwise.
pub fn init_server_logging(config: &ServerConfig) -> Result<(), ServerError> {
    let result = match &config.log_dir {
        Some(dir) => roster_core::init_logging(&config.log_level, &dir.to_string_lossy()),
        None => roster_core::init_stderr_logging(&config.log_level),
    };
    result.map_err(ServerError::Logging)
}

/// Binds the configured address and serves until a shutdown signal.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let state = AppState::new(SharedDb::new(DbLocation::File(config.db_path.clone())));
    info!(
        "event=server_start module=server status=ok addr={addr} db_path={}",
        config.db_path.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("event=shutdown module=server status=ok signal=ctrl_c"),
        () = terminate => info!("event=shutdown module=server status=ok signal=sigterm"),
    }
}
