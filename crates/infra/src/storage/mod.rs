//! Opaque key/value secret storage
//!
//! The credential store persists everything through this trait: the
//! platform keychain in production, an in-memory map for tests and
//! headless environments.

mod keychain;
mod memory;

pub use keychain::KeyringStore;
pub use memory::MemoryStore;

use dockhand_domain::Result;

/// Minimal secret storage interface.
///
/// Values are opaque strings; callers own serialization. Keychain
/// operations are quick enough to run inline on the async runtime.
pub trait SecretStore: Send + Sync {
    /// Read a secret. `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`dockhand_domain::DockhandError::Storage`] when the backing
    /// store cannot be accessed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a secret, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`dockhand_domain::DockhandError::Storage`] when the backing
    /// store cannot be accessed.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a secret. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`dockhand_domain::DockhandError::Storage`] when the backing
    /// store cannot be accessed.
    fn delete(&self, key: &str) -> Result<()>;
}
