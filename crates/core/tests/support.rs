//! Shared fixtures for core integration tests: an in-memory connection
//! store and a recording API factory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dockhand_core::{ApiClientFactory, ConnectionStore, DeployApi};
use dockhand_domain::{
    Application, ApplicationLogs, Configuration, Connection, ConnectionInput, DeployResponse,
    Deployment, DockhandError, Result, TestConnectionOutcome,
};

pub fn connection(id: &str, name: &str, server_url: &str) -> Connection {
    Connection {
        id: id.to_string(),
        name: name.to_string(),
        server_url: server_url.to_string(),
        api_token: "abcdefghij".to_string(),
    }
}

/// Connection store backed by a plain in-memory configuration. Tests mutate
/// it directly and emit bus events themselves, so event ordering stays
/// under test control.
pub struct MemoryConnectionStore {
    config: tokio::sync::RwLock<Configuration>,
}

impl MemoryConnectionStore {
    pub fn new(config: Configuration) -> Arc<Self> {
        Arc::new(Self { config: tokio::sync::RwLock::new(config) })
    }

    pub async fn set_config(&self, config: Configuration) {
        *self.config.write().await = config;
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn load(&self) -> Result<Configuration> {
        Ok(self.config.read().await.clone())
    }

    async fn add_connection(&self, input: ConnectionInput) -> Result<Connection> {
        let created = Connection::new(input);
        let mut config = self.config.write().await;
        config.connections.push(created.clone());
        if config.active_connection_id.is_none() {
            config.active_connection_id = Some(created.id.clone());
        }
        Ok(created)
    }

    async fn update_connection(&self, connection: Connection) -> Result<()> {
        let mut config = self.config.write().await;
        if let Some(existing) =
            config.connections.iter_mut().find(|c| c.id == connection.id)
        {
            *existing = connection;
        }
        Ok(())
    }

    async fn remove_connection(&self, id: &str) -> Result<()> {
        let mut config = self.config.write().await;
        config.connections.retain(|c| c.id != id);
        if config.active_connection_id.as_deref() == Some(id) {
            config.active_connection_id = config.connections.first().map(|c| c.id.clone());
        }
        Ok(())
    }

    async fn switch_active(&self, id: &str) -> Result<()> {
        let mut config = self.config.write().await;
        if !config.connections.iter().any(|c| c.id == id) {
            return Err(DockhandError::Configuration(format!("no connection with id {id}")));
        }
        config.active_connection_id = Some(id.to_string());
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        *self.config.write().await = Configuration::default();
        Ok(())
    }
}

/// API stub returning empty collections; counts list calls through the
/// factory's shared counter.
pub struct RecordingApi {
    pub list_calls: Arc<AtomicUsize>,
    pub outcome: TestConnectionOutcome,
}

#[async_trait]
impl DeployApi for RecordingApi {
    async fn test_connection(&self) -> TestConnectionOutcome {
        self.outcome.clone()
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn get_application(&self, _uuid: &str) -> Result<Application> {
        Err(DockhandError::Internal("not scripted".into()))
    }

    async fn start_application(&self, _uuid: &str) -> Result<()> {
        Ok(())
    }

    async fn stop_application(&self, _uuid: &str) -> Result<()> {
        Ok(())
    }

    async fn restart_application(&self, _uuid: &str) -> Result<()> {
        Ok(())
    }

    async fn deploy_application(&self, _uuid: &str) -> Result<DeployResponse> {
        Ok(DeployResponse { message: "queued".into(), deployment_uuid: None })
    }

    async fn application_logs(&self, _uuid: &str, _lines: u32) -> Result<ApplicationLogs> {
        Ok(ApplicationLogs { logs: String::new() })
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn list_deployments_for_application(
        &self,
        _uuid: &str,
        _skip: u32,
        _take: u32,
    ) -> Result<Vec<Deployment>> {
        Ok(Vec::new())
    }

    async fn get_deployment(&self, _uuid: &str) -> Result<Deployment> {
        Err(DockhandError::Internal("not scripted".into()))
    }

    async fn cancel_deployment(&self, _uuid: &str) -> Result<()> {
        Ok(())
    }
}

/// Factory that records every server URL it was asked to bind.
pub struct RecordingFactory {
    created: Mutex<Vec<String>>,
    list_calls: Arc<AtomicUsize>,
    outcome: Mutex<TestConnectionOutcome>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
            list_calls: Arc::new(AtomicUsize::new(0)),
            outcome: Mutex::new(TestConnectionOutcome::ok()),
        })
    }

    pub fn created_urls(&self) -> Vec<String> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn total_list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn set_test_outcome(&self, outcome: TestConnectionOutcome) {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }
}

impl ApiClientFactory for RecordingFactory {
    fn create(&self, server_url: &str, _api_token: &str) -> Result<Arc<dyn DeployApi>> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).push(server_url.to_string());
        Ok(Arc::new(RecordingApi {
            list_calls: Arc::clone(&self.list_calls),
            outcome: self.outcome.lock().unwrap_or_else(PoisonError::into_inner).clone(),
        }))
    }
}
