use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::{relay, require_credential, ApiError, AppState};
use crate::config::is_valid_model;
use crate::session::CreateSessionRequest;

pub const MSG_LIST_FAILED: &str = "Failed to fetch sessions";
pub const MSG_CREATE_FAILED: &str = "Failed to create session";
pub const MSG_DELETE_FAILED: &str = "Failed to delete session";
pub const MSG_REPO_REQUIRED: &str = "repoOwner and repoName are required";

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let credential = match require_credential(&headers) {
        Ok(credential) => credential,
        Err(e) => return e.into_response(),
    };

    match state.control_plane.list_sessions(&credential).await {
        Ok(upstream) => {
            if !upstream.is_success() {
                tracing::warn!(status = upstream.status, "control plane rejected session list");
            }
            relay(upstream, MSG_LIST_FAILED)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch sessions");
            ApiError::internal(MSG_LIST_FAILED).into_response()
        }
    }
}

/// POST /api/sessions
///
/// Body: `{repoOwner, repoName, title?, model?}`. A missing model becomes the
/// configured default; an unknown one is rejected before any upstream call.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Response {
    let credential = match require_credential(&headers) {
        Ok(credential) => credential,
        Err(e) => return e.into_response(),
    };

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_response(),
    };

    let request = match normalize_create(request, &state.default_model) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state
        .control_plane
        .create_session(&credential, &request)
        .await
    {
        Ok(upstream) => {
            if upstream.is_success() {
                tracing::info!(
                    repo_owner = %request.repo_owner,
                    repo_name = %request.repo_name,
                    "session created"
                );
            } else {
                tracing::warn!(status = upstream.status, "control plane rejected session creation");
            }
            relay(upstream, MSG_CREATE_FAILED)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create session");
            ApiError::internal(MSG_CREATE_FAILED).into_response()
        }
    }
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Response {
    let credential = match require_credential(&headers) {
        Ok(credential) => credential,
        Err(e) => return e.into_response(),
    };

    let session_id = match path {
        Ok(Path(session_id)) => session_id,
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_response(),
    };

    match state
        .control_plane
        .delete_session(&credential, &session_id)
        .await
    {
        Ok(upstream) => {
            if upstream.is_success() {
                tracing::info!(session_id = %session_id, "session deleted");
            } else {
                tracing::warn!(
                    session_id = %session_id,
                    status = upstream.status,
                    "control plane rejected session delete"
                );
            }
            relay(upstream, MSG_DELETE_FAILED)
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "failed to delete session");
            ApiError::internal(MSG_DELETE_FAILED).into_response()
        }
    }
}

/// Trim fields, default the model, and reject what the control plane would.
pub fn normalize_create(
    request: CreateSessionRequest,
    default_model: &str,
) -> Result<CreateSessionRequest, ApiError> {
    let repo_owner = request.repo_owner.trim().to_string();
    let repo_name = request.repo_name.trim().to_string();
    if repo_owner.is_empty() || repo_name.is_empty() {
        return Err(ApiError::bad_request(MSG_REPO_REQUIRED));
    }

    let model = match request.model.as_deref().map(str::trim) {
        Some(model) if !model.is_empty() => model.to_string(),
        _ => default_model.to_string(),
    };
    if !is_valid_model(&model) {
        return Err(ApiError::bad_request(format!("Unknown model: {model}")));
    }

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(CreateSessionRequest {
        repo_owner,
        repo_name,
        title,
        model: Some(model),
    })
}
