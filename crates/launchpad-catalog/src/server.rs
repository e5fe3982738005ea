//! Server setup and lifecycle management

use crate::api::{create_router, with_cors};
use crate::api::rest::state::AppState;
use crate::config::{CatalogConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::storage::{InMemoryStorage, PostgresStorage, ServiceStorage};
use launchpad_auth::TokenVerifier;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Catalog daemon server
pub struct Server {
    config: CatalogConfig,
    storage: Arc<dyn ServiceStorage>,
    verifier: TokenVerifier,
}

impl Server {
    /// Create a new server, connecting the configured storage backend
    pub async fn new(config: CatalogConfig) -> DaemonResult<Self> {
        let verifier = config.auth.verifier()?;

        let storage: Arc<dyn ServiceStorage> = match &config.storage {
            StorageConfig::Memory => {
                tracing::warn!("Using in-memory storage; services are lost on restart");
                Arc::new(InMemoryStorage::new())
            }
            StorageConfig::Postgres {
                url,
                max_connections,
                connect_timeout_secs,
                query_timeout_secs,
            } => Arc::new(
                PostgresStorage::new(
                    url,
                    *max_connections,
                    *connect_timeout_secs,
                    *query_timeout_secs,
                )
                .await?,
            ),
        };

        Ok(Self {
            config,
            storage,
            verifier,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.storage.clone(), self.verifier.clone());
        let mut app = create_router(state);
        if self.config.server.enable_cors {
            app = with_cors(app);
        }

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Catalog daemon listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Catalog daemon shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install terminate handler");
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
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
