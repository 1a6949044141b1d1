//! Remote entities returned by the Coolify API
//!
//! None of these are persisted locally; the server is the sole source of
//! truth and every fetch replaces the previous snapshot wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status;

/// An application managed by the remote server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub app_type: Option<String>,
    /// Raw status text as reported by the server; normalize with
    /// [`Application::status`].
    #[serde(default)]
    pub status: String,
    /// Public URL, when the application exposes one.
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(default)]
    pub git_repository: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub build_pack: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Normalized status for display and logic.
    pub fn status(&self) -> ApplicationStatus {
        status::normalize(&self.status)
    }

    /// Whether the raw status reports the container as running at all,
    /// regardless of health.
    pub fn is_running(&self) -> bool {
        status::is_running(&self.status)
    }
}

/// Closed application status taxonomy produced by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "running:healthy")]
    RunningHealthy,
    #[serde(rename = "running:unhealthy")]
    RunningUnhealthy,
    #[serde(rename = "exited:unhealthy")]
    ExitedUnhealthy,
    #[serde(rename = "stopped")]
    Stopped,
    #[serde(rename = "building")]
    Building,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunningHealthy => "running:healthy",
            Self::RunningUnhealthy => "running:unhealthy",
            Self::ExitedUnhealthy => "exited:unhealthy",
            Self::Stopped => "stopped",
            Self::Building => "building",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tail of an application's container logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLogs {
    pub logs: String,
}

/// Acknowledgment returned when a deployment is triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub message: String,
    #[serde(default)]
    pub deployment_uuid: Option<String>,
}

/// Outcome of probing a server with the supplied credentials.
///
/// Produced by the one operation that never errors; every failure mode is
/// folded into `success == false` plus a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConnectionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestConnectionOutcome {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// One deployment run of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub deployment_uuid: String,
    pub application_name: String,
    pub status: DeploymentStatus,
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
    #[serde(default)]
    pub git_type: Option<String>,
    #[serde(default)]
    pub is_webhook: bool,
    #[serde(default)]
    pub is_api: bool,
    #[serde(default)]
    pub force_rebuild: bool,
    #[serde(default)]
    pub restart_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deployment {
    /// Whether this deployment is still in flight and may be cancelled.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Deployment status enum as constrained by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Success,
    Failed,
    InProgress,
    Queued,
    Cancelled,
}

impl DeploymentStatus {
    /// Active deployments are the cancellable ones: exactly `in_progress`
    /// and `queued`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Queued)
    }

    pub fn can_cancel(&self) -> bool {
        self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::InProgress => "in_progress",
            Self::Queued => "queued",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
