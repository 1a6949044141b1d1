//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Dockhand
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DockhandError {
    /// No usable configuration (e.g. no active connection). A state, not a
    /// failure: callers render "not configured" rather than an error.
    #[error("Not configured: {0}")]
    Configuration(String),

    /// Persistence I/O failure in the credential store. Never swallowed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The server could not be reached at all.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status. Carries the message
    /// extracted from the response body when one is present.
    #[error("{0}")]
    Remote(String),

    /// Malformed user input, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Dockhand operations
pub type Result<T> = std::result::Result<T, DockhandError>;
