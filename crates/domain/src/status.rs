//! Normalization of raw application status strings
//!
//! The server reports application state as free-form text such as
//! `running:healthy (2 minutes ago)` or `exited:unhealthy`. These functions
//! collapse that text into the closed [`ApplicationStatus`] taxonomy.
//!
//! Matching is case-insensitive and ordered; earlier rules win because the
//! qualifier substrings overlap (`exited:unhealthy` must not fall through
//! to the bare `unhealthy` rules).

use crate::types::ApplicationStatus;

/// Map a raw status string to the closed taxonomy.
///
/// Total: never fails, unmatched input maps to
/// [`ApplicationStatus::Unknown`].
pub fn normalize(raw: &str) -> ApplicationStatus {
    let status = raw.to_lowercase();

    if status.contains("building") {
        return ApplicationStatus::Building;
    }

    if status.contains("stopped") {
        return ApplicationStatus::Stopped;
    }

    if status.contains("exited") && status.contains("unhealthy") {
        return ApplicationStatus::ExitedUnhealthy;
    }

    // Exited without a health qualifier reads as a plain stop.
    if status.contains("exited") {
        return ApplicationStatus::Stopped;
    }

    if status.contains("running") && status.contains("unhealthy") {
        return ApplicationStatus::RunningUnhealthy;
    }

    if status.contains("running") && status.contains("healthy") {
        return ApplicationStatus::RunningHealthy;
    }

    if status.contains("running") {
        return ApplicationStatus::RunningHealthy;
    }

    if status.contains("healthy") {
        return ApplicationStatus::RunningHealthy;
    }

    ApplicationStatus::Unknown
}

/// Whether the raw status reports the container as running, regardless of
/// health.
pub fn is_running(raw: &str) -> bool {
    raw.to_lowercase().contains("running")
}
