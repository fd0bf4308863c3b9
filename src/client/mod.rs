use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;

use crate::error::{PortalError, Result};
use crate::session::{
    CreateSessionRequest, CreatedSession, Credential, Repository, Session, SessionApi, SessionList,
};

/// Client for the portal's own `/api` routes.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct RepoList {
    #[serde(default)]
    repos: Vec<Repository>,
}

/// A model as served by `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCatalog {
    pub models: Vec<ModelInfo>,
    pub default_model: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| PortalError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a base url".into(),
            });
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(PortalError::transport)?;
        Ok(Self { client, base_url })
    }

    fn request(&self, method: Method, segments: &[&str], credential: &Credential) -> Result<RequestBuilder> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base url".into(),
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(credential.token()))
    }

    pub async fn list_repos(&self, credential: &Credential) -> Result<Vec<Repository>> {
        let response = self.request(Method::GET, &["repos"], credential)?.send().await?;
        let list: RepoList = check(response).await?.json().await?;
        Ok(list.repos)
    }

    pub async fn list_models(&self, credential: &Credential) -> Result<ModelCatalog> {
        let response = self.request(Method::GET, &["models"], credential)?.send().await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn a non-2xx response into `Upstream`, using the `error` field when present.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or(text);
    Err(PortalError::Upstream {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SessionApi for PortalClient {
    async fn list_sessions(&self, credential: &Credential) -> Result<Vec<Session>> {
        let response = self
            .request(Method::GET, &["sessions"], credential)?
            .send()
            .await?;
        let list: SessionList = check(response).await?.json().await?;
        Ok(list.sessions)
    }

    async fn create_session(
        &self,
        credential: &Credential,
        request: &CreateSessionRequest,
    ) -> Result<CreatedSession> {
        let response = self
            .request(Method::POST, &["sessions"], credential)?
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete_session(&self, credential: &Credential, session_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &["sessions", session_id], credential)?
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
