//! Domain constants shared across crates

use std::time::Duration;

/// Interval between auto-refresh cycles, measured from the completion of the
/// previous fetch.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Path prefix prepended to every API endpoint.
pub const API_BASE_PATH: &str = "/api/v1";

/// Default number of log lines requested from the server.
pub const DEFAULT_LOG_LINES: u32 = 100;

/// Default page size when listing deployments for one application.
pub const DEFAULT_DEPLOYMENT_PAGE_SIZE: u32 = 10;

/// Minimum plausible length for an API token.
pub const MIN_API_TOKEN_LENGTH: usize = 10;

/// Keys under which the credential store persists its state.
pub mod storage_keys {
    /// Serialized connection list (JSON array).
    pub const CONNECTIONS: &str = "connections";
    /// Id of the active connection (bare string).
    pub const ACTIVE_CONNECTION_ID: &str = "active_connection_id";
    /// Legacy single-connection layout: bare server URL.
    pub const LEGACY_SERVER_URL: &str = "server_url";
    /// Legacy single-connection layout: bare API token.
    pub const LEGACY_API_TOKEN: &str = "api_token";
}
