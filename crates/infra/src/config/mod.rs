//! Credential store: persisted connections and the active selection

mod store;

pub use store::CredentialStore;
