use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::{require_credential, ApiError, AppState};
use crate::config::MODEL_OPTIONS;

pub const MSG_REPOS_FAILED: &str = "Failed to fetch repositories";

/// GET /api/repos
pub async fn list_repos(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let credential = match require_credential(&headers) {
        Ok(credential) => credential,
        Err(e) => return e.into_response(),
    };

    match state.repos.list_repos(&credential).await {
        Ok(repos) => Json(json!({ "repos": repos })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch repositories");
            ApiError::internal(MSG_REPOS_FAILED).into_response()
        }
    }
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = require_credential(&headers) {
        return e.into_response();
    }

    Json(json!({
        "models": MODEL_OPTIONS,
        "defaultModel": state.default_model,
    }))
    .into_response()
}
