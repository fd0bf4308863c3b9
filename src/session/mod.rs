pub mod context;
pub mod feed;
pub mod form;
pub mod reconcile;

pub use context::Credential;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A session as reported by the control plane. Read-only from this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    pub repo_owner: String,
    pub repo_name: String,

    /// Lifecycle status. Values are owned by the control plane.
    #[serde(default)]
    pub status: String,

    /// Epoch milliseconds.
    pub created_at: i64,

    /// Epoch milliseconds. Absent until the control plane first touches the session.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Session {
    /// `owner/name` of the owning repository.
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }

    /// Title to show for this session. Falls back to the repository name
    /// so it is never blank.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => self.repo_full_name(),
        }
    }

    /// `updated_at` if present, else `created_at`.
    pub fn effective_timestamp(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn effective_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.effective_timestamp())
    }
}

/// A repository the caller can start a session against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Body of `POST /api/sessions`, forwarded to the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub repo_owner: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// What the control plane returns for a successful creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Session listing envelope. Extra fields (cursors etc.) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Detail view route for a session.
pub fn session_path(session_id: &str) -> String {
    format!("/session/{session_id}")
}

/// Client-side view of the portal's session endpoints.
///
/// Non-2xx responses come back as `PortalError::Upstream` carrying the
/// server's error message; network failures as `PortalError::Transport`.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn list_sessions(&self, credential: &Credential) -> Result<Vec<Session>>;

    async fn create_session(
        &self,
        credential: &Credential,
        request: &CreateSessionRequest,
    ) -> Result<CreatedSession>;

    async fn delete_session(&self, credential: &Credential, session_id: &str) -> Result<()>;
}
