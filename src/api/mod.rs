//! HTTP surface of the portal.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - liveness, no credential required
//! - `GET /api/models` - model catalog
//! - `GET /api/repos` - repositories visible to the caller
//! - `GET /api/sessions` - proxied session list
//! - `POST /api/sessions` - proxied session creation
//! - `DELETE /api/sessions/:id` - proxied session deletion
//!
//! Everything except health requires `Authorization: Bearer <token>`.

pub mod repos;
pub mod server;
pub mod sessions;

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use crate::config::PortalConfig;
use crate::control_plane::{ControlPlane, ControlPlaneClient, UpstreamResponse};
use crate::error::Result;
use crate::github::{GithubClient, RepoSource};
use crate::session::Credential;

pub const MSG_UNAUTHORIZED: &str = "Unauthorized";

/// Shared, immutable state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub control_plane: Arc<dyn ControlPlane>,
    pub repos: Arc<dyn RepoSource>,
    pub default_model: String,
}

impl AppState {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        repos: Arc<dyn RepoSource>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            control_plane,
            repos,
            default_model: default_model.into(),
        }
    }

    /// Wire up the real upstream clients from config.
    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        let control_plane = ControlPlaneClient::new(&config.control_plane)?;
        let repos = GithubClient::new(&config.github)?;
        Ok(Self::new(
            Arc::new(control_plane),
            Arc::new(repos),
            config.effective_default_model(),
        ))
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/models", get(repos::list_models))
        .route("/api/repos", get(repos::list_repos))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/sessions/:id", delete(sessions::delete_session))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// An error response: `{"error": message}` with a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, MSG_UNAUTHORIZED)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Pull the caller's credential out of the request headers.
/// Runs before any I/O.
pub fn require_credential(headers: &HeaderMap) -> std::result::Result<Credential, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credential::from_authorization)
        .ok_or_else(ApiError::unauthorized)
}

/// Translate an upstream response for the caller.
///
/// Success bodies pass through verbatim as JSON. Failures keep the upstream
/// status and wrap the body text as `{"error": ...}`, or `fallback` when the
/// body is empty.
pub fn relay(upstream: UpstreamResponse, fallback: &str) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);

    if !status.is_success() {
        let message = if upstream.body.trim().is_empty() {
            fallback.to_string()
        } else {
            upstream.body
        };
        return ApiError::new(status, message).into_response();
    }

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.body,
    )
        .into_response()
}
