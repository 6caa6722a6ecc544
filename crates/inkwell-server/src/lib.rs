//! Inkwell API server.
//!
//! An axum service over Postgres for a small blog CMS:
//!
//! - **Routes**: `/api/v1` for the public API, `/internal` for probes
//! - **Handlers**: auth, posts, users, categories, imports and exports
//! - **Middleware**: bearer authentication, actor resolution, authorization
//! - **Storage**: uploaded images and generated export files
//!
//! Authorization decisions come from `inkwell-policy`; spreadsheet imports
//! run through `inkwell-import`.

#![warn(clippy::all)]

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Owns the configuration and state of a running server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Connect to the database and prepare shared state.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        self.config
            .server
            .socket_addr()
            .context("Invalid bind address")
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(%addr, "Server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown");
}
