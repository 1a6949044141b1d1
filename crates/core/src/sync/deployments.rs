//! Sync controller for the deployments collection

use std::sync::{Arc, Mutex, PoisonError};

use dockhand_domain::{Connection, Deployment, DockhandError, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::state::{SyncConfig, SyncPhase, SyncSnapshot};
use crate::ports::{ApiClientFactory, DeployApi};

/// Owns the bound client and polling loop for the deployments list.
///
/// Same lifecycle as the applications controller; additionally guarantees
/// that exposed deployments are ordered by creation time, most recent
/// first, independent of the order the server returns.
pub struct DeploymentsController {
    factory: Arc<dyn ApiClientFactory>,
    config: SyncConfig,
    inner: Arc<Inner>,
    loop_token: Mutex<CancellationToken>,
}

struct Inner {
    client: tokio::sync::RwLock<Option<Arc<dyn DeployApi>>>,
    state: tokio::sync::RwLock<SyncSnapshot<Deployment>>,
}

impl DeploymentsController {
    pub fn new(factory: Arc<dyn ApiClientFactory>, config: SyncConfig) -> Self {
        Self {
            factory,
            config,
            inner: Arc::new(Inner {
                client: tokio::sync::RwLock::new(None),
                state: tokio::sync::RwLock::new(SyncSnapshot::default()),
            }),
            loop_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Bind to an active connection, or to nothing. See
    /// [`crate::ApplicationsController::bind`].
    ///
    /// # Errors
    ///
    /// Returns an error when the factory cannot construct a client.
    pub async fn bind(&self, connection: Option<&Connection>) -> Result<()> {
        let token = self.replace_loop_token();

        let Some(connection) = connection else {
            *self.inner.client.write().await = None;
            let mut state = self.inner.state.write().await;
            state.phase = SyncPhase::Idle;
            state.data.clear();
            state.error = None;
            state.configured = false;
            debug!("deployments controller unbound");
            return Ok(());
        };

        let client = self.factory.create(&connection.server_url, &connection.api_token)?;
        *self.inner.client.write().await = Some(client);

        let auto_refresh = {
            let mut state = self.inner.state.write().await;
            state.phase = SyncPhase::Loading;
            state.data.clear();
            state.error = None;
            state.configured = true;
            state.auto_refresh
        };

        debug!(connection = %connection.name, "deployments controller bound");
        self.spawn_cycle(token, auto_refresh);
        Ok(())
    }

    /// User-initiated refresh. No-op while unbound.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure after recording it in the snapshot.
    pub async fn refresh(&self) -> Result<()> {
        let Some(client) = self.inner.client.read().await.clone() else {
            return Ok(());
        };

        {
            let mut state = self.inner.state.write().await;
            if state.phase != SyncPhase::Loading {
                state.phase = SyncPhase::Refreshing;
            }
        }

        let result = client.list_deployments().await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(err) => Err(err.clone()),
        };
        self.inner.apply_fetch_result(result).await;
        outcome
    }

    /// Enable or disable the auto-refresh loop.
    pub async fn set_auto_refresh(&self, enabled: bool) {
        let (changed, bound) = {
            let mut state = self.inner.state.write().await;
            let changed = state.auto_refresh != enabled;
            state.auto_refresh = enabled;
            (changed, state.configured)
        };

        if !changed {
            return;
        }

        if enabled {
            if bound && self.inner.client.read().await.is_some() {
                let token = self.replace_loop_token();
                self.spawn_cycle(token, true);
            }
        } else {
            self.cancel_loop();
        }
    }

    /// Flip auto-refresh and return the new setting.
    pub async fn toggle_auto_refresh(&self) -> bool {
        let enabled = !self.inner.state.read().await.auto_refresh;
        self.set_auto_refresh(enabled).await;
        enabled
    }

    /// Cancel the polling loop, keeping data and binding intact.
    pub fn stop(&self) {
        self.cancel_loop();
    }

    /// Current state for the rendering layer.
    pub async fn snapshot(&self) -> SyncSnapshot<Deployment> {
        self.inner.state.read().await.clone()
    }

    /// Cancel an in-flight or queued deployment, then refetch.
    ///
    /// # Errors
    ///
    /// `Configuration` when unbound; the remote failure otherwise.
    pub async fn cancel_deployment(&self, uuid: &str) -> Result<()> {
        let client = self
            .inner
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| DockhandError::Configuration("no active connection".into()))?;
        client.cancel_deployment(uuid).await?;

        let result = client.list_deployments().await;
        self.inner.apply_fetch_result(result).await;
        Ok(())
    }

    fn replace_loop_token(&self) -> CancellationToken {
        let mut guard = self.loop_token.lock().unwrap_or_else(PoisonError::into_inner);
        guard.cancel();
        let fresh = CancellationToken::new();
        *guard = fresh.clone();
        fresh
    }

    fn cancel_loop(&self) {
        self.loop_token.lock().unwrap_or_else(PoisonError::into_inner).cancel();
    }

    fn spawn_cycle(&self, cancel: CancellationToken, repeat: bool) {
        let inner = Arc::clone(&self.inner);
        let interval = self.config.refresh_interval;

        tokio::spawn(async move {
            inner.fetch_cycle(&cancel).await;
            if !repeat {
                return;
            }
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("deployments refresh loop cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
                if cancel.is_cancelled() {
                    debug!("deployments refresh loop cancelled");
                    break;
                }
                inner.fetch_cycle(&cancel).await;
            }
        });
    }
}

impl Inner {
    async fn fetch_cycle(&self, cancel: &CancellationToken) {
        let Some(client) = self.client.read().await.clone() else {
            return;
        };

        let result = client.list_deployments().await;

        if cancel.is_cancelled() {
            return;
        }

        self.apply_fetch_result(result).await;
    }

    async fn apply_fetch_result(&self, result: Result<Vec<Deployment>>) {
        let mut state = self.state.write().await;
        match result {
            Ok(mut deployments) => {
                // Most recent first; stable so the server's order breaks
                // ties.
                deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                state.data = deployments;
                state.error = None;
            }
            Err(err) => {
                warn!(error = %err, "deployments refresh failed");
                state.error = Some(err.to_string());
            }
        }
        state.phase = SyncPhase::Idle;
    }
}

impl Drop for DeploymentsController {
    fn drop(&mut self) {
        if let Ok(guard) = self.loop_token.lock() {
            guard.cancel();
        }
    }
}
