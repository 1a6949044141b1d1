//! Sync controller for the applications collection

use std::sync::{Arc, Mutex, PoisonError};

use dockhand_domain::{Application, Connection, DeployResponse, DockhandError, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::state::{SyncConfig, SyncPhase, SyncSnapshot};
use crate::ports::{ApiClientFactory, DeployApi};

/// Owns the bound client and polling loop for the applications list.
///
/// Binding is explicit: [`ApplicationsController::bind`] tears down the
/// previous client and loop and builds fresh ones through the injected
/// factory. Background refresh failures are stored, never raised; mutation
/// and manual-refresh failures propagate to the caller.
pub struct ApplicationsController {
    factory: Arc<dyn ApiClientFactory>,
    config: SyncConfig,
    inner: Arc<Inner>,
    loop_token: Mutex<CancellationToken>,
}

struct Inner {
    client: tokio::sync::RwLock<Option<Arc<dyn DeployApi>>>,
    state: tokio::sync::RwLock<SyncSnapshot<Application>>,
}

impl ApplicationsController {
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

    /// Bind to an active connection, or to nothing.
    ///
    /// Cancels the running loop in both cases. With a connection, a new
    /// client is constructed, the first fetch starts immediately, and the
    /// loop resumes when auto-refresh is enabled. With `None`, data is
    /// cleared and the controller settles into the unconfigured state,
    /// which is a state, not a failure.
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
            debug!("applications controller unbound");
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

        debug!(connection = %connection.name, "applications controller bound");
        self.spawn_cycle(token, auto_refresh);
        Ok(())
    }

    /// User-initiated refresh: `Idle → Refreshing → Idle`.
    ///
    /// No-op while unbound.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure after recording it in the snapshot;
    /// previous data stays visible either way.
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

        let result = client.list_applications().await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(err) => Err(err.clone()),
        };
        self.inner.apply_fetch_result(result).await;
        outcome
    }

    /// Enable or disable the auto-refresh loop.
    ///
    /// Disabling cancels the pending timer immediately without waiting for
    /// an in-flight fetch; enabling while bound starts a fresh cycle
    /// immediately rather than waiting one full interval.
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
    pub async fn snapshot(&self) -> SyncSnapshot<Application> {
        self.inner.state.read().await.clone()
    }

    /// Start the application, then refetch the collection.
    ///
    /// # Errors
    ///
    /// `Configuration` when unbound; the remote failure otherwise.
    pub async fn start_application(&self, uuid: &str) -> Result<()> {
        let client = self.require_client().await?;
        client.start_application(uuid).await?;
        self.refetch_after_mutation(&client).await;
        Ok(())
    }

    /// Stop the application, then refetch the collection.
    ///
    /// # Errors
    ///
    /// `Configuration` when unbound; the remote failure otherwise.
    pub async fn stop_application(&self, uuid: &str) -> Result<()> {
        let client = self.require_client().await?;
        client.stop_application(uuid).await?;
        self.refetch_after_mutation(&client).await;
        Ok(())
    }

    /// Restart the application, then refetch the collection.
    ///
    /// # Errors
    ///
    /// `Configuration` when unbound; the remote failure otherwise.
    pub async fn restart_application(&self, uuid: &str) -> Result<()> {
        let client = self.require_client().await?;
        client.restart_application(uuid).await?;
        self.refetch_after_mutation(&client).await;
        Ok(())
    }

    /// Trigger a deployment, then refetch the collection.
    ///
    /// # Errors
    ///
    /// `Configuration` when unbound; the remote failure otherwise.
    pub async fn deploy_application(&self, uuid: &str) -> Result<DeployResponse> {
        let client = self.require_client().await?;
        let response = client.deploy_application(uuid).await?;
        self.refetch_after_mutation(&client).await;
        Ok(response)
    }

    async fn require_client(&self) -> Result<Arc<dyn DeployApi>> {
        self.inner
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| DockhandError::Configuration("no active connection".into()))
    }

    // Mutations refetch unconditionally; a failed refetch lands in the
    // snapshot like any background failure instead of masking the
    // mutation's success.
    async fn refetch_after_mutation(&self, client: &Arc<dyn DeployApi>) {
        let result = client.list_applications().await;
        self.inner.apply_fetch_result(result).await;
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
                        debug!("applications refresh loop cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
                // Cancellation during the sleep must win over the tick.
                if cancel.is_cancelled() {
                    debug!("applications refresh loop cancelled");
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

        let result = client.list_applications().await;

        // The binding changed or auto-refresh was disabled while this fetch
        // was in flight; its result must not clobber the new state.
        if cancel.is_cancelled() {
            return;
        }

        self.apply_fetch_result(result).await;
    }

    async fn apply_fetch_result(&self, result: Result<Vec<Application>>) {
        let mut state = self.state.write().await;
        match result {
            Ok(applications) => {
                state.data = applications;
                state.error = None;
            }
            Err(err) => {
                warn!(error = %err, "applications refresh failed");
                state.error = Some(err.to_string());
            }
        }
        state.phase = SyncPhase::Idle;
    }
}

impl Drop for ApplicationsController {
    fn drop(&mut self) {
        // Best-effort cleanup so no orphaned loop outlives the controller.
        if let Ok(guard) = self.loop_token.lock() {
            guard.cancel();
        }
    }
}
