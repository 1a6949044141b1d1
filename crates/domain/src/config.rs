//! Persisted configuration: named server connections and the active selection

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// One configured remote endpoint.
///
/// Persisted with camelCase field names to stay wire-compatible with the
/// JSON the legacy client wrote to secure storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Opaque generated id, unique across the store, immutable after
    /// creation.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Absolute http(s) base URL, trailing slashes stripped.
    pub server_url: String,
    /// Bearer token for the server's API.
    pub api_token: String,
}

impl Connection {
    /// Create a connection with a freshly generated id.
    pub fn new(input: ConnectionInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            server_url: normalize_server_url(&input.server_url),
            api_token: input.api_token,
        }
    }
}

/// User-supplied fields for creating or editing a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInput {
    pub name: String,
    pub server_url: String,
    pub api_token: String,
}

/// Process-wide persisted state: every configured connection plus the id of
/// the one currently in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub connections: Vec<Connection>,
    pub active_connection_id: Option<String>,
}

impl Configuration {
    /// Resolve the active connection reference, if any.
    pub fn active_connection(&self) -> Option<&Connection> {
        let id = self.active_connection_id.as_deref()?;
        self.connections.iter().find(|c| c.id == id)
    }

    /// Whether a usable active connection exists.
    pub fn is_configured(&self) -> bool {
        self.active_connection().is_some()
    }
}

/// Strip trailing slashes so endpoint paths can be appended directly.
pub fn normalize_server_url(server_url: &str) -> String {
    server_url.trim().trim_end_matches('/').to_string()
}

/// Derive a display label from a server URL's host component.
///
/// Falls back to the raw input when the URL does not parse; used when
/// migrating a legacy configuration that never had a name.
pub fn host_label(server_url: &str) -> String {
    Url::parse(server_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| server_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(id: &str) -> Connection {
        Connection {
            id: id.to_string(),
            name: format!("conn-{id}"),
            server_url: "https://coolify.example.com".to_string(),
            api_token: "abcdefghij".to_string(),
        }
    }

    #[test]
    fn new_connection_gets_unique_id_and_normalized_url() {
        let input = ConnectionInput {
            name: "prod".into(),
            server_url: "https://coolify.example.com/".into(),
            api_token: "abcdefghij".into(),
        };
        let a = Connection::new(input.clone());
        let b = Connection::new(input);

        assert_ne!(a.id, b.id);
        assert_eq!(a.server_url, "https://coolify.example.com");
    }

    #[test]
    fn active_connection_resolves_by_id() {
        let config = Configuration {
            connections: vec![connection("a"), connection("b")],
            active_connection_id: Some("b".into()),
        };
        assert_eq!(config.active_connection().map(|c| c.id.as_str()), Some("b"));
        assert!(config.is_configured());
    }

    #[test]
    fn dangling_active_id_resolves_to_none() {
        let config = Configuration {
            connections: vec![connection("a")],
            active_connection_id: Some("gone".into()),
        };
        assert!(config.active_connection().is_none());
        assert!(!config.is_configured());
    }

    #[test]
    fn empty_configuration_is_not_configured() {
        assert!(!Configuration::default().is_configured());
    }

    #[test]
    fn connection_serializes_camel_case() {
        let json = serde_json::to_value(connection("a")).unwrap();
        assert!(json.get("serverUrl").is_some());
        assert!(json.get("apiToken").is_some());
        assert!(json.get("server_url").is_none());
    }

    #[test]
    fn host_label_falls_back_to_raw_input() {
        assert_eq!(host_label("https://coolify.example.com/"), "coolify.example.com");
        assert_eq!(host_label("not a url"), "not a url");
    }
}
