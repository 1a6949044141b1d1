//! Conversions from external infrastructure errors into domain errors.

use dockhand_domain::DockhandError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;

/// User-facing message for transport-level failures, distinguishing
/// "cannot reach server" from "server returned an error".
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to server. Please check URL and connection.";

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DockhandError);

impl From<InfraError> for DockhandError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        let mapped = match value {
            KeyringError::BadEncoding(_) => {
                DockhandError::Storage("credential in keychain is not valid UTF-8".into())
            }
            KeyringError::TooLong(name, limit) => DockhandError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            KeyringError::Invalid(attr, reason) => DockhandError::Storage(format!(
                "keychain attribute '{attr}' is invalid: {reason}"
            )),
            KeyringError::NoStorageAccess(err) => {
                DockhandError::Storage(format!("unable to access secure storage: {err}"))
            }
            KeyringError::PlatformFailure(err) => {
                DockhandError::Storage(format!("keychain platform error: {err}"))
            }
            other => DockhandError::Storage(other.to_string()),
        };
        InfraError(mapped)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let mapped = if value.is_connect() || value.is_timeout() {
            DockhandError::Network(UNREACHABLE_MESSAGE.into())
        } else if value.is_decode() {
            DockhandError::Internal(format!("failed to decode server response: {value}"))
        } else {
            DockhandError::Internal(value.to_string())
        };
        InfraError(mapped)
    }
}
