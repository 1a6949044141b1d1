//! # Dockhand Core
//!
//! Business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) implemented by `dockhand-infra`
//! - The per-collection sync controllers and their polling lifecycle
//! - The configuration change bus
//! - The session that wires store, bus and controllers together
//!
//! ## Architecture Principles
//! - Only depends on `dockhand-domain`
//! - No keychain, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod events;
pub mod ports;
pub mod session;
pub mod sync;

pub use events::{ConfigEvent, ConfigEvents};
pub use ports::{ApiClientFactory, ConnectionStore, DeployApi};
pub use session::SyncSession;
pub use sync::applications::ApplicationsController;
pub use sync::deployments::DeploymentsController;
pub use sync::state::{SyncConfig, SyncPhase, SyncSnapshot};
