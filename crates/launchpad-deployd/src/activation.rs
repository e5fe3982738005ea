//! Activation: settling a `Pending` deployment
//!
//! Runs after the create request has already been answered. The effector
//! is called once; the deployment then moves to `Running` or `Failed` and
//! stays there. Nothing here is reported back to the client that asked.

use crate::effector::Effector;
use crate::storage::DeploymentStorage;
use launchpad_types::{Deployment, DeploymentEvent, DeploymentStatus};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

/// Capacity of the status event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Carries one deployment from `Pending` to its terminal status
pub struct Activation {
    storage: Arc<dyn DeploymentStorage>,
    effector: Arc<dyn Effector>,
    event_tx: broadcast::Sender<DeploymentEvent>,
}

impl Activation {
    pub fn new(storage: Arc<dyn DeploymentStorage>, effector: Arc<dyn Effector>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            effector,
            event_tx,
        }
    }

    /// Receive an event for every deployment that settles from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DeploymentEvent> {
        self.event_tx.subscribe()
    }

    /// Call the effector and record the outcome.
    ///
    /// Returns the status the deployment was moved to. A failed status
    /// write is logged and not retried.
    pub async fn run(&self, deployment: Deployment) -> DeploymentStatus {
        let (target, reason) = match self.effector.activate(&deployment).await {
            Ok(()) => (DeploymentStatus::Running, None),
            Err(e) => {
                tracing::warn!(
                    deployment_id = %deployment.id,
                    service_id = %deployment.service_id,
                    error = %e,
                    "Deployment activation failed"
                );
                (DeploymentStatus::Failed, Some(e.to_string()))
            }
        };

        let status = match deployment.status.transition(target) {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(deployment_id = %deployment.id, error = %e, "Refusing status change");
                return deployment.status;
            }
        };

        match self.storage.set_status(&deployment.id, status).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(
                    deployment_id = %deployment.id,
                    status = %status,
                    "Deployment disappeared before its status could be recorded"
                );
                return status;
            }
            Err(e) => {
                tracing::error!(
                    deployment_id = %deployment.id,
                    status = %status,
                    error = %e,
                    "Failed to update deployment status"
                );
                return status;
            }
        }

        if status == DeploymentStatus::Running {
            tracing::info!(
                deployment_id = %deployment.id,
                service_id = %deployment.service_id,
                "Deployment running"
            );
        }

        // No subscribers is fine
        let _ = self.event_tx.send(DeploymentEvent {
            deployment_id: deployment.id,
            service_id: deployment.service_id,
            status,
            reason,
            timestamp: chrono::Utc::now(),
        });

        status
    }
}

/// Hands persisted deployments to [`Activation`] without making the caller wait
#[derive(Clone)]
pub struct Dispatcher {
    activation: Arc<Activation>,
    queue: Option<mpsc::Sender<Deployment>>,
}

impl Dispatcher {
    /// One detached task per deployment
    pub fn detached(activation: Arc<Activation>) -> Self {
        Self {
            activation,
            queue: None,
        }
    }

    /// A bounded queue drained by `workers` tasks.
    ///
    /// Must be called from within a tokio runtime. The pool stops once every
    /// clone of the returned dispatcher is dropped and the queue is empty.
    pub fn pool(activation: Arc<Activation>, workers: usize, capacity: usize) -> (Self, WorkerPool) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = rx.clone();
                let activation = activation.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting for the next item
                        let next = rx.lock().await.recv().await;
                        match next {
                            Some(deployment) => {
                                activation.run(deployment).await;
                            }
                            None => break,
                        }
                    }
                    tracing::debug!(worker, "Activation worker stopped");
                })
            })
            .collect();

        let dispatcher = Self {
            activation,
            queue: Some(tx),
        };
        (dispatcher, WorkerPool { handles })
    }

    pub fn activation(&self) -> &Arc<Activation> {
        &self.activation
    }

    /// Queue a deployment for activation. Never waits.
    ///
    /// In pool mode a full queue, or a pool that has shut down, falls back
    /// to a detached task.
    pub fn dispatch(&self, deployment: Deployment) {
        let deployment = match &self.queue {
            None => deployment,
            Some(queue) => match queue.try_send(deployment) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(deployment)) => {
                    tracing::warn!(
                        deployment_id = %deployment.id,
                        "Activation queue full, running detached"
                    );
                    deployment
                }
                Err(mpsc::error::TrySendError::Closed(deployment)) => {
                    tracing::error!(
                        deployment_id = %deployment.id,
                        "Activation pool is gone, running detached"
                    );
                    deployment
                }
            },
        };

        let activation = self.activation.clone();
        tokio::spawn(async move {
            activation.run(deployment).await;
        });
    }
}

/// Handles to the pool workers
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for the workers to drain the queue and exit
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Activation worker panicked");
            }
        }
    }
}
