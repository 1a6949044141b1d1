//! Multi-connection credential store over opaque secret storage
//!
//! Persists the connection list as a JSON array under one key and the
//! active connection id under another, and migrates the legacy
//! single-connection layout (bare URL + token keys) the first time it finds
//! no current-format state. Every successful mutation persists fully, then
//! announces itself on the injected change bus.

use std::sync::Arc;

use async_trait::async_trait;
use dockhand_core::{ConfigEvent, ConfigEvents, ConnectionStore};
use dockhand_domain::config::{host_label, normalize_server_url};
use dockhand_domain::constants::storage_keys;
use dockhand_domain::utils::validation;
use dockhand_domain::{Configuration, Connection, ConnectionInput, DockhandError, Result};
use tracing::{debug, info, warn};

use crate::storage::SecretStore;

/// Credential store backed by a [`SecretStore`].
pub struct CredentialStore {
    secrets: Arc<dyn SecretStore>,
    events: ConfigEvents,
}

impl CredentialStore {
    pub fn new(secrets: Arc<dyn SecretStore>, events: ConfigEvents) -> Self {
        Self { secrets, events }
    }

    /// Read the persisted connection list, treating malformed JSON as an
    /// empty list rather than failing the session.
    fn read_connections(&self) -> Result<Vec<Connection>> {
        let Some(raw) = self.secrets.get(storage_keys::CONNECTIONS)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(connections) => Ok(connections),
            Err(err) => {
                warn!(error = %err, "persisted connection list is malformed; starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_connections(&self, connections: &[Connection]) -> Result<()> {
        let raw = serde_json::to_string(connections)
            .map_err(|err| DockhandError::Storage(format!("serializing connections: {err}")))?;
        self.secrets.set(storage_keys::CONNECTIONS, &raw)
    }

    fn read_active_id(&self) -> Result<Option<String>> {
        self.secrets.get(storage_keys::ACTIVE_CONNECTION_ID)
    }

    fn write_active_id(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => self.secrets.set(storage_keys::ACTIVE_CONNECTION_ID, id),
            None => self.secrets.delete(storage_keys::ACTIVE_CONNECTION_ID),
        }
    }

    /// One-time migration of the legacy single-connection layout.
    ///
    /// Skipped whenever a current-format configuration exists, even an
    /// empty one, so connections a user cleared are never resurrected. The
    /// legacy keys are deleted only after the new format has been fully
    /// persisted.
    fn migrate_if_needed(&self) -> Result<()> {
        if self.secrets.get(storage_keys::CONNECTIONS)?.is_some() {
            return Ok(());
        }

        let Some(server_url) = self.secrets.get(storage_keys::LEGACY_SERVER_URL)? else {
            return Ok(());
        };
        let Some(api_token) = self.secrets.get(storage_keys::LEGACY_API_TOKEN)? else {
            return Ok(());
        };

        let connection = Connection::new(ConnectionInput {
            name: host_label(&server_url),
            server_url: normalize_server_url(&server_url),
            api_token,
        });

        self.write_connections(std::slice::from_ref(&connection))?;
        self.write_active_id(Some(&connection.id))?;

        self.secrets.delete(storage_keys::LEGACY_SERVER_URL)?;
        self.secrets.delete(storage_keys::LEGACY_API_TOKEN)?;

        info!(name = %connection.name, "migrated legacy configuration");
        Ok(())
    }

    fn validate_input(input: &ConnectionInput) -> Result<()> {
        validation::validate_connection_name(&input.name)?;
        validation::validate_server_url(&input.server_url)?;
        validation::validate_api_token(&input.api_token)?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for CredentialStore {
    async fn load(&self) -> Result<Configuration> {
        self.migrate_if_needed()?;

        let connections = self.read_connections()?;
        let active_connection_id = self.read_active_id()?;
        Ok(Configuration { connections, active_connection_id })
    }

    async fn add_connection(&self, input: ConnectionInput) -> Result<Connection> {
        Self::validate_input(&input)?;

        let mut connections = self.read_connections()?;
        let active_id = self.read_active_id()?;
        let has_active = active_id
            .as_deref()
            .map(|id| connections.iter().any(|c| c.id == id))
            .unwrap_or(false);

        let connection = Connection::new(input);
        connections.push(connection.clone());
        self.write_connections(&connections)?;

        if !has_active {
            self.write_active_id(Some(&connection.id))?;
        }

        self.events.emit(ConfigEvent::ConnectionAdded);
        Ok(connection)
    }

    async fn update_connection(&self, connection: Connection) -> Result<()> {
        Self::validate_input(&ConnectionInput {
            name: connection.name.clone(),
            server_url: connection.server_url.clone(),
            api_token: connection.api_token.clone(),
        })?;

        let mut connections = self.read_connections()?;
        let Some(existing) = connections.iter_mut().find(|c| c.id == connection.id) else {
            debug!(id = %connection.id, "update for unknown connection ignored");
            return Ok(());
        };

        *existing = Connection {
            server_url: normalize_server_url(&connection.server_url),
            ..connection
        };
        self.write_connections(&connections)?;

        self.events.emit(ConfigEvent::ConnectionUpdated);
        Ok(())
    }

    async fn remove_connection(&self, id: &str) -> Result<()> {
        let mut connections = self.read_connections()?;
        let before = connections.len();
        connections.retain(|c| c.id != id);

        if connections.len() == before {
            debug!(id = %id, "removal of unknown connection ignored");
            return Ok(());
        }

        self.write_connections(&connections)?;

        // Never leave a dangling active reference: promote the first
        // remaining connection, or clear.
        if self.read_active_id()?.as_deref() == Some(id) {
            let next = connections.first().map(|c| c.id.clone());
            self.write_active_id(next.as_deref())?;
        }

        self.events.emit(ConfigEvent::ConnectionRemoved);
        Ok(())
    }

    async fn switch_active(&self, id: &str) -> Result<()> {
        let connections = self.read_connections()?;
        if !connections.iter().any(|c| c.id == id) {
            return Err(DockhandError::Configuration(format!("no connection with id {id}")));
        }

        self.write_active_id(Some(id))?;

        self.events.emit(ConfigEvent::ActiveConnectionChanged);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        // An empty list is written, not deleted, so a later load never
        // re-runs legacy migration over state the user explicitly cleared.
        self.write_connections(&[])?;
        self.write_active_id(None)?;

        self.events.emit(ConfigEvent::Cleared);
        Ok(())
    }
}
