//! Controller state machine and the snapshot handed to consumers

use std::time::Duration;

use dockhand_domain::constants::AUTO_REFRESH_INTERVAL;
use serde::{Deserialize, Serialize};

/// Where a controller is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Never bound to a connection.
    Uninitialized,
    /// First fetch for the current binding is in flight; no data yet.
    Loading,
    /// At rest. Data (possibly stale) and the last background error are
    /// available.
    Idle,
    /// A user-initiated refresh is in flight; previous data stays visible.
    Refreshing,
}

/// Configuration for a sync controller.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Pause between the completion of one auto-refresh fetch and the start
    /// of the next.
    pub refresh_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { refresh_interval: AUTO_REFRESH_INTERVAL }
    }
}

/// Cloneable view of a controller's state for the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSnapshot<T> {
    pub phase: SyncPhase,
    pub data: Vec<T>,
    /// Message from the most recent failed fetch. Cleared on the next
    /// success; stale data stays visible alongside it.
    pub error: Option<String>,
    pub auto_refresh: bool,
    /// Whether the controller is bound to an active connection. Not being
    /// configured is a state, not an error.
    pub configured: bool,
}

impl<T> Default for SyncSnapshot<T> {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Uninitialized,
            data: Vec::new(),
            error: None,
            auto_refresh: true,
            configured: false,
        }
    }
}

impl<T> SyncSnapshot<T> {
    /// True while the first fetch of a binding is still in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == SyncPhase::Loading
    }

    /// True while a user-initiated refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.phase == SyncPhase::Refreshing
    }
}
