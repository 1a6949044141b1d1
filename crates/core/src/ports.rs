//! Port interfaces between core logic and infrastructure
//!
//! These traits define the boundaries between the sync/session layer and
//! the adapters that talk to secure storage and the remote server.

use std::sync::Arc;

use async_trait::async_trait;
use dockhand_domain::{
    Application, ApplicationLogs, Configuration, Connection, ConnectionInput, DeployResponse,
    Deployment, Result, TestConnectionOutcome,
};

/// Typed client for one remote server connection.
///
/// Implementations are immutable for their lifetime: they are constructed
/// for exactly one `(server_url, api_token)` pair, and switching
/// credentials means constructing a new instance. This keeps in-flight
/// requests from silently changing identity.
#[async_trait]
pub trait DeployApi: Send + Sync {
    /// Probe the server by listing applications. Never fails; every error
    /// is folded into the outcome.
    async fn test_connection(&self) -> TestConnectionOutcome;

    async fn list_applications(&self) -> Result<Vec<Application>>;

    async fn get_application(&self, uuid: &str) -> Result<Application>;

    /// Fire-and-acknowledge lifecycle action.
    async fn start_application(&self, uuid: &str) -> Result<()>;

    /// Fire-and-acknowledge lifecycle action.
    async fn stop_application(&self, uuid: &str) -> Result<()>;

    /// Fire-and-acknowledge lifecycle action.
    async fn restart_application(&self, uuid: &str) -> Result<()>;

    /// Trigger a deployment for the application.
    async fn deploy_application(&self, uuid: &str) -> Result<DeployResponse>;

    /// Tail the application's container logs.
    async fn application_logs(&self, uuid: &str, lines: u32) -> Result<ApplicationLogs>;

    async fn list_deployments(&self) -> Result<Vec<Deployment>>;

    async fn list_deployments_for_application(
        &self,
        uuid: &str,
        skip: u32,
        take: u32,
    ) -> Result<Vec<Deployment>>;

    async fn get_deployment(&self, uuid: &str) -> Result<Deployment>;

    async fn cancel_deployment(&self, uuid: &str) -> Result<()>;
}

/// Constructs a bound [`DeployApi`] client for a credential pair.
///
/// Injected into controllers and the session so that rebinding on a
/// configuration change is an explicit, testable step.
pub trait ApiClientFactory: Send + Sync {
    /// Build a client bound to the given server and token.
    ///
    /// # Errors
    ///
    /// Returns an error when a client cannot be constructed from the
    /// supplied values (e.g. a token that cannot form a valid header).
    fn create(&self, server_url: &str, api_token: &str) -> Result<Arc<dyn DeployApi>>;
}

/// Persistent store for named server connections.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Load the current configuration, migrating any legacy layout first.
    async fn load(&self) -> Result<Configuration>;

    /// Create a connection from user input, persist it, and return it.
    /// Becomes the active connection when none is set yet.
    async fn add_connection(&self, input: ConnectionInput) -> Result<Connection>;

    /// Replace the stored connection with a matching id. Silently a no-op
    /// when the id is unknown.
    async fn update_connection(&self, connection: Connection) -> Result<()>;

    /// Delete a connection. When it was active, another remaining
    /// connection is promoted, or the active reference is cleared.
    async fn remove_connection(&self, id: &str) -> Result<()>;

    /// Make the connection with the given id active.
    async fn switch_active(&self, id: &str) -> Result<()>;

    /// Erase all persisted connections and the active selection.
    async fn clear_all(&self) -> Result<()>;
}
