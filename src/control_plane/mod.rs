//! Client for the control plane, the external service that owns session
//! lifecycle. The client attaches the caller's credential and hands back the
//! raw upstream status and body; interpreting them is the caller's job.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};

use crate::config::ControlPlaneConfig;
use crate::error::{PortalError, Result};
use crate::session::{CreateSessionRequest, Credential};

/// Status and body text of an upstream response, untranslated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Session operations against the control plane.
///
/// Non-2xx statuses are returned as `Ok`; only transport failures are `Err`.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn list_sessions(&self, credential: &Credential) -> Result<UpstreamResponse>;

    async fn create_session(
        &self,
        credential: &Credential,
        request: &CreateSessionRequest,
    ) -> Result<UpstreamResponse>;

    async fn delete_session(
        &self,
        credential: &Credential,
        session_id: &str,
    ) -> Result<UpstreamResponse>;
}

/// reqwest-backed control plane client. No retries; one timeout per request.
#[derive(Clone)]
pub struct ControlPlaneClient {
    client: Client,
    base_url: Url,
}

impl ControlPlaneClient {
    pub fn new(config: &ControlPlaneConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PortalError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "not a base url".into(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(PortalError::transport)?;

        Ok(Self { client, base_url })
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PortalError::InvalidUrl {
                    url: self.base_url.to_string(),
                    reason: "not a base url".into(),
                })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Send one request with the caller's bearer credential attached.
    pub async fn send(
        &self,
        method: Method,
        segments: &[&str],
        credential: &Credential,
        body: Option<serde_json::Value>,
    ) -> Result<UpstreamResponse> {
        let url = self.url_for(segments)?;
        tracing::debug!(method = %method, url = %url, "control plane request");

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(credential.token());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl ControlPlane for ControlPlaneClient {
    async fn list_sessions(&self, credential: &Credential) -> Result<UpstreamResponse> {
        self.send(Method::GET, &["sessions"], credential, None).await
    }

    async fn create_session(
        &self,
        credential: &Credential,
        request: &CreateSessionRequest,
    ) -> Result<UpstreamResponse> {
        let body = serde_json::to_value(request)?;
        self.send(Method::POST, &["sessions"], credential, Some(body))
            .await
    }

    async fn delete_session(
        &self,
        credential: &Credential,
        session_id: &str,
    ) -> Result<UpstreamResponse> {
        self.send(Method::DELETE, &["sessions", session_id], credential, None)
            .await
    }
}
