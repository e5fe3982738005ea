//! Server setup and lifecycle management

use crate::activation::{Activation, Dispatcher, WorkerPool};
use crate::api::rest::state::AppState;
use crate::api::{create_router, with_cors};
use crate::config::{ActivationMode, DeploydConfig, StorageConfig};
use crate::effector::HttpEffector;
use crate::error::{DaemonError, DaemonResult};
use crate::orchestrator::DeploymentOrchestrator;
use crate::storage::{DeploymentStorage, InMemoryStorage, PostgresStorage};
use crate::validator::CatalogClient;
use launchpad_auth::TokenIssuer;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Deployment daemon server
pub struct Server {
    config: DeploydConfig,
    orchestrator: Arc<DeploymentOrchestrator>,
    workers: Option<WorkerPool>,
}

impl Server {
    /// Wire up storage, the catalog client, the effector and the dispatcher.
    ///
    /// Fails when the signing secret is missing or storage is unreachable.
    pub async fn new(config: DeploydConfig) -> DaemonResult<Self> {
        let secret = config.auth.signing_secret()?;
        let issuer = TokenIssuer::new(crate::SERVICE_NAME, &secret)
            .with_ttl(Duration::from_secs(config.auth.token_ttl_secs));

        let validator = CatalogClient::new(
            config.core.url.clone(),
            issuer,
            Duration::from_secs(config.core.timeout_secs),
        )
        .map_err(|e| DaemonError::Config(e.to_string()))?;

        let effector = HttpEffector::new(
            config.effector.url.clone(),
            Duration::from_secs(config.effector.timeout_secs),
        )
        .map_err(|e| DaemonError::Config(e.to_string()))?;

        let storage: Arc<dyn DeploymentStorage> = match &config.storage {
            StorageConfig::Memory => {
                tracing::warn!("Using in-memory storage; deployments are lost on restart");
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

        let activation = Arc::new(Activation::new(storage.clone(), Arc::new(effector)));
        let (dispatcher, workers) = match config.activation.mode {
            ActivationMode::Detached => (Dispatcher::detached(activation), None),
            ActivationMode::Pool => {
                let (dispatcher, pool) = Dispatcher::pool(
                    activation,
                    config.activation.workers,
                    config.activation.queue_capacity,
                );
                tracing::info!(
                    workers = pool.size(),
                    queue_capacity = config.activation.queue_capacity,
                    "Activation worker pool started"
                );
                (dispatcher, Some(pool))
            }
        };

        let orchestrator = Arc::new(DeploymentOrchestrator::new(
            Arc::new(validator),
            storage,
            dispatcher,
        ));

        Ok(Self {
            config,
            orchestrator,
            workers,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let Server {
            config,
            orchestrator,
            workers,
        } = self;
        let addr = config.server.listen_addr;

        let mut app = create_router(AppState::new(orchestrator));
        if config.server.enable_cors {
            app = with_cors(app);
        }

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Deployment daemon listening on {}", addr);
        tracing::info!(core_service_url = %config.core.url, "Validating against catalog");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Deployment daemon shutting down");

        // The router and its dispatcher are gone, so the queue is closed
        if let Some(workers) = workers {
            tracing::info!("Waiting for queued activations");
            workers.join().await;
        }

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
