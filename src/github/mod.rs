use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::error::{PortalError, Result};
use crate::session::{Credential, Repository};

const USER_AGENT: &str = concat!("session-portal/", env!("CARGO_PKG_VERSION"));

/// Lists repositories the caller can start sessions against.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn list_repos(&self, credential: &Credential) -> Result<Vec<Repository>>;
}

/// Repository listing from the GitHub REST API, using the caller's token.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_base_url: Url,
    per_page: u32,
}

/// The subset of GitHub's repository object we read.
#[derive(Debug, Deserialize)]
struct GithubRepo {
    id: u64,
    name: String,
    full_name: String,
    owner: GithubOwner,
    description: Option<String>,
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Deserialize)]
struct GithubOwner {
    login: String,
}

impl From<GithubRepo> for Repository {
    fn from(repo: GithubRepo) -> Self {
        Self {
            id: repo.id,
            full_name: repo.full_name,
            owner: repo.owner.login,
            name: repo.name,
            description: repo.description,
            private: repo.private,
        }
    }
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let api_base_url =
            Url::parse(&config.api_base_url).map_err(|e| PortalError::InvalidUrl {
                url: config.api_base_url.clone(),
                reason: e.to_string(),
            })?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(PortalError::transport)?;
        Ok(Self {
            client,
            api_base_url,
            per_page: config.per_page.clamp(1, 100),
        })
    }

    fn repos_url(&self) -> Result<Url> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::InvalidUrl {
                url: self.api_base_url.to_string(),
                reason: "not a base url".into(),
            })?
            .pop_if_empty()
            .extend(["user", "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("sort", "updated");
        Ok(url)
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn list_repos(&self, credential: &Credential) -> Result<Vec<Repository>> {
        let url = self.repos_url()?;
        let response = self
            .client
            .get(url)
            .bearer_auth(credential.token())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let repos: Vec<GithubRepo> = response.json().await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }
}
