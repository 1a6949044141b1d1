//! Session wiring: store, change bus, and controllers
//!
//! The session owns the reactive part of the data layer: it resolves the
//! active connection at startup, listens for configuration changes, and
//! rebinds both sync controllers whenever the active connection changes.
//! The rendering layer talks to the controllers directly and to the session
//! for everything connection-scoped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dockhand_domain::utils::validation;
use dockhand_domain::{Connection, DockhandError, Result, TestConnectionOutcome};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::ConfigEvents;
use crate::ports::{ApiClientFactory, ConnectionStore, DeployApi};
use crate::sync::applications::ApplicationsController;
use crate::sync::deployments::DeploymentsController;
use crate::sync::state::SyncConfig;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Binds the credential store to the sync controllers for one client
/// session.
pub struct SyncSession {
    events: ConfigEvents,
    inner: Arc<SessionInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

struct SessionInner {
    store: Arc<dyn ConnectionStore>,
    factory: Arc<dyn ApiClientFactory>,
    applications: Arc<ApplicationsController>,
    deployments: Arc<DeploymentsController>,
    active: tokio::sync::RwLock<Option<Connection>>,
    api: tokio::sync::RwLock<Option<Arc<dyn DeployApi>>>,
}

impl SyncSession {
    pub fn new(
        store: Arc<dyn ConnectionStore>,
        factory: Arc<dyn ApiClientFactory>,
        events: ConfigEvents,
        config: SyncConfig,
    ) -> Self {
        let applications =
            Arc::new(ApplicationsController::new(Arc::clone(&factory), config.clone()));
        let deployments = Arc::new(DeploymentsController::new(Arc::clone(&factory), config));

        Self {
            events,
            inner: Arc::new(SessionInner {
                store,
                factory,
                applications,
                deployments,
                active: tokio::sync::RwLock::new(None),
                api: tokio::sync::RwLock::new(None),
            }),
            listener: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Controller for the applications collection.
    pub fn applications(&self) -> Arc<ApplicationsController> {
        Arc::clone(&self.inner.applications)
    }

    /// Controller for the deployments collection.
    pub fn deployments(&self) -> Arc<DeploymentsController> {
        Arc::clone(&self.inner.deployments)
    }

    /// Load the configuration, bind the controllers, and start servicing
    /// configuration changes.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from the initial load and factory
    /// failures from the initial bind.
    pub async fn start(&self) -> Result<()> {
        SessionInner::rebind(&self.inner).await?;

        let inner = Arc::clone(&self.inner);
        let mut receiver = self.events.subscribe();
        let cancel = self.shutdown.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = receiver.recv() => match received {
                        Ok(event) => {
                            debug!(?event, "configuration change received");
                            if let Err(err) = SessionInner::rebind(&inner).await {
                                error!(error = %err, "rebind after configuration change failed");
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            // Events are only triggers; one rebind catches up.
                            warn!(skipped, "configuration events lagged");
                            if let Err(err) = SessionInner::rebind(&inner).await {
                                error!(error = %err, "rebind after lagged events failed");
                            }
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });

        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!("sync session started");
        Ok(())
    }

    /// Stop the listener and both polling loops. Data already fetched stays
    /// readable.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener task does not wind down in time.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown.cancel();
        self.inner.applications.stop();
        self.inner.deployments.stop();

        let handle = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            tokio::time::timeout(SHUTDOWN_TIMEOUT, handle)
                .await
                .map_err(|_| {
                    DockhandError::Internal("session listener did not stop in time".into())
                })?
                .map_err(|err| {
                    DockhandError::Internal(format!("session listener failed: {err}"))
                })?;
        }

        info!("sync session stopped");
        Ok(())
    }

    /// Whether an active connection is currently bound.
    pub async fn is_configured(&self) -> bool {
        self.inner.active.read().await.is_some()
    }

    /// The currently bound connection, if any.
    pub async fn active_connection(&self) -> Option<Connection> {
        self.inner.active.read().await.clone()
    }

    /// Client bound to the active connection, for one-off operations the
    /// controllers do not own (detail lookups, logs, paged deployment
    /// lists).
    pub async fn api(&self) -> Option<Arc<dyn DeployApi>> {
        self.inner.api.read().await.clone()
    }

    /// Probe a candidate credential pair without touching the bound state.
    ///
    /// Never fails: validation failures, construction failures and remote
    /// failures are all folded into the outcome.
    pub async fn test_connection(
        &self,
        server_url: &str,
        api_token: &str,
    ) -> TestConnectionOutcome {
        if let Err(err) = validation::validate_server_url(server_url) {
            return TestConnectionOutcome::failed(err.to_string());
        }
        if let Err(err) = validation::validate_api_token(api_token) {
            return TestConnectionOutcome::failed(err.to_string());
        }

        match self.inner.factory.create(server_url, api_token) {
            Ok(client) => client.test_connection().await,
            Err(err) => TestConnectionOutcome::failed(err.to_string()),
        }
    }
}

impl SessionInner {
    /// Reload the configuration and rebind everything to its active
    /// connection. The store has already fully persisted by the time an
    /// event arrives, so this observes a consistent state.
    async fn rebind(inner: &Arc<Self>) -> Result<()> {
        let config = inner.store.load().await?;
        let active = config.active_connection().cloned();

        match &active {
            Some(connection) => {
                info!(connection = %connection.name, "binding to active connection");
                let client =
                    inner.factory.create(&connection.server_url, &connection.api_token)?;
                *inner.api.write().await = Some(client);
            }
            None => {
                info!("no active connection; unbinding");
                *inner.api.write().await = None;
            }
        }

        inner.applications.bind(active.as_ref()).await?;
        inner.deployments.bind(active.as_ref()).await?;
        *inner.active.write().await = active;
        Ok(())
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        // Best-effort: stop the listener if shutdown was never called.
        self.shutdown.cancel();
    }
}
