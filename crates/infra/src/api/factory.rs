//! Factory producing bound API clients

use std::sync::Arc;

use dockhand_core::{ApiClientFactory, DeployApi};
use dockhand_domain::Result;

use super::CoolifyClient;

/// Default [`ApiClientFactory`]: every call constructs a fresh, immutable
/// [`CoolifyClient`] bound to the supplied credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolifyClientFactory;

impl CoolifyClientFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ApiClientFactory for CoolifyClientFactory {
    fn create(&self, server_url: &str, api_token: &str) -> Result<Arc<dyn DeployApi>> {
        Ok(Arc::new(CoolifyClient::new(server_url, api_token)?))
    }
}
