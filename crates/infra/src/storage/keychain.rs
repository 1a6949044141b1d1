//! Platform keychain adapter
//!
//! Thin wrapper over the platform keychain for storing connection secrets
//! across macOS (Keychain Access), Windows (Credential Manager), and Linux
//! (Secret Service API).

use dockhand_domain::Result;
use keyring::Entry;
use tracing::debug;

use super::SecretStore;
use crate::errors::InfraError;

/// Secret storage backed by the platform keychain.
pub struct KeyringStore {
    service_name: String,
}

impl KeyringStore {
    /// Create a store scoped to one service name (e.g. `"dockhand"`).
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|err| InfraError::from(err).into())
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "storing secret in keychain");
        self.entry(key)?.set_password(value).map_err(|err| InfraError::from(err).into())
    }

    fn delete(&self, key: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "deleting secret from keychain");
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
