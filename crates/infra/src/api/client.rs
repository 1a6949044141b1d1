//! Typed client for one Coolify server connection
//!
//! A client is bound to exactly one `(server_url, api_token)` pair and is
//! immutable for its lifetime; switching credentials means constructing a
//! new instance, so in-flight requests can never change identity.

use async_trait::async_trait;
use dockhand_core::DeployApi;
use dockhand_domain::config::normalize_server_url;
use dockhand_domain::constants::API_BASE_PATH;
use dockhand_domain::{
    Application, ApplicationLogs, DeployResponse, Deployment, DockhandError, Result,
    TestConnectionOutcome,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::errors::InfraError;

/// Shape of the error body the server sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Authenticated JSON client for the API under `{server_url}/api/v1`.
pub struct CoolifyClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoolifyClient {
    /// Build a client bound to the given server and token.
    ///
    /// # Errors
    ///
    /// `Validation` when the token cannot form a request header; `Internal`
    /// when the underlying client cannot be constructed.
    pub fn new(server_url: &str, api_token: &str) -> Result<Self> {
        let base_url = normalize_server_url(server_url);

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_token}")).map_err(|_| {
            DockhandError::Validation("API token contains characters not allowed in a header".into())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| DockhandError::Internal(format!("building HTTP client: {err}")))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_BASE_PATH, path)
    }

    /// Send a request and classify any failure uniformly: transport
    /// failures become `Network` with a single user-facing message, non-2xx
    /// responses become `Remote` carrying the body's `message` field when
    /// one is present.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| DockhandError::from(InfraError::from(err)))?;

        let status = response.status();
        debug!(%status, "received API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(DockhandError::Remote(extract_error_message(status, &body)))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response.json().await.map_err(|err| InfraError::from(err).into())
    }

    /// Fire-and-acknowledge: the response body is irrelevant beyond the
    /// status.
    async fn acknowledge(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }
}

fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| {
            format!(
                "Status {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        })
}

#[async_trait]
impl DeployApi for CoolifyClient {
    async fn test_connection(&self) -> TestConnectionOutcome {
        match self.list_applications().await {
            Ok(_) => TestConnectionOutcome::ok(),
            Err(err) => {
                let message = match err {
                    DockhandError::Remote(msg) | DockhandError::Network(msg) => msg,
                    other => other.to_string(),
                };
                TestConnectionOutcome::failed(message)
            }
        }
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.get_json(self.http.get(self.endpoint("/applications"))).await
    }

    async fn get_application(&self, uuid: &str) -> Result<Application> {
        self.get_json(self.http.get(self.endpoint(&format!("/applications/{uuid}")))).await
    }

    async fn start_application(&self, uuid: &str) -> Result<()> {
        self.acknowledge(self.http.get(self.endpoint(&format!("/applications/{uuid}/start"))))
            .await
    }

    async fn stop_application(&self, uuid: &str) -> Result<()> {
        self.acknowledge(self.http.get(self.endpoint(&format!("/applications/{uuid}/stop"))))
            .await
    }

    async fn restart_application(&self, uuid: &str) -> Result<()> {
        self.acknowledge(self.http.get(self.endpoint(&format!("/applications/{uuid}/restart"))))
            .await
    }

    async fn deploy_application(&self, uuid: &str) -> Result<DeployResponse> {
        self.get_json(self.http.get(self.endpoint("/deploy")).query(&[("uuid", uuid)])).await
    }

    async fn application_logs(&self, uuid: &str, lines: u32) -> Result<ApplicationLogs> {
        self.get_json(
            self.http
                .get(self.endpoint(&format!("/applications/{uuid}/logs")))
                .query(&[("lines", lines)]),
        )
        .await
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.get_json(self.http.get(self.endpoint("/deployments"))).await
    }

    async fn list_deployments_for_application(
        &self,
        uuid: &str,
        skip: u32,
        take: u32,
    ) -> Result<Vec<Deployment>> {
        self.get_json(
            self.http
                .get(self.endpoint(&format!("/deployments/applications/{uuid}")))
                .query(&[("skip", skip), ("take", take)]),
        )
        .await
    }

    async fn get_deployment(&self, uuid: &str) -> Result<Deployment> {
        self.get_json(self.http.get(self.endpoint(&format!("/deployments/{uuid}")))).await
    }

    async fn cancel_deployment(&self, uuid: &str) -> Result<()> {
        self.acknowledge(
            self.http.post(self.endpoint(&format!("/deployments/{uuid}/cancel"))),
        )
        .await
    }
}
