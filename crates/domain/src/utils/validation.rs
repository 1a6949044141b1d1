//! User-input validation, applied before anything touches storage or the
//! network

use url::Url;

use crate::constants::MIN_API_TOKEN_LENGTH;
use crate::errors::{DockhandError, Result};

/// Validate a server URL: must be non-empty and parse as absolute http(s).
///
/// # Errors
///
/// Returns [`DockhandError::Validation`] with a user-facing message.
pub fn validate_server_url(server_url: &str) -> Result<()> {
    if server_url.trim().is_empty() {
        return Err(DockhandError::Validation("Server URL is required".into()));
    }

    let valid = Url::parse(server_url.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);

    if !valid {
        return Err(DockhandError::Validation(
            "Please enter a valid URL (e.g.: https://coolify.example.com)".into(),
        ));
    }

    Ok(())
}

/// Validate an API token: non-empty and of plausible minimum length.
///
/// # Errors
///
/// Returns [`DockhandError::Validation`] with a user-facing message.
pub fn validate_api_token(api_token: &str) -> Result<()> {
    if api_token.trim().is_empty() {
        return Err(DockhandError::Validation("API token is required".into()));
    }

    if api_token.len() < MIN_API_TOKEN_LENGTH {
        return Err(DockhandError::Validation("API token seems too short".into()));
    }

    Ok(())
}

/// Validate a connection display name: non-empty.
///
/// # Errors
///
/// Returns [`DockhandError::Validation`] with a user-facing message.
pub fn validate_connection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DockhandError::Validation("Connection name is required".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_and_http_urls_pass() {
        assert!(validate_server_url("https://coolify.example.com").is_ok());
        assert!(validate_server_url("http://10.0.0.5:8000").is_ok());
    }

    #[test]
    fn non_http_schemes_fail() {
        assert!(validate_server_url("ftp://x.com").is_err());
        assert!(validate_server_url("coolify.example.com").is_err());
    }

    #[test]
    fn empty_url_fails_with_required_message() {
        let err = validate_server_url("   ").unwrap_err();
        assert!(matches!(err, DockhandError::Validation(msg) if msg.contains("required")));
    }

    #[test]
    fn token_length_boundary() {
        assert!(validate_api_token("short").is_err());
        assert!(validate_api_token("abcdefghi").is_err()); // 9 chars
        assert!(validate_api_token("abcdefghij").is_ok()); // 10 chars
    }

    #[test]
    fn empty_token_fails() {
        assert!(validate_api_token("").is_err());
    }

    #[test]
    fn connection_name_must_be_non_empty() {
        assert!(validate_connection_name("prod").is_ok());
        assert!(validate_connection_name("  ").is_err());
    }
}
