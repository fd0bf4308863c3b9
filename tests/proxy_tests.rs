//! HTTP-level tests for the API proxy, using in-memory upstream fakes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use session_portal::api::{build_router, AppState};
use session_portal::control_plane::{ControlPlane, UpstreamResponse};
use session_portal::error::{PortalError, Result};
use session_portal::github::RepoSource;
use session_portal::session::{CreateSessionRequest, Credential, Repository};

// ── Fakes ──────────────────────────────────────────────────────

/// Control plane that replays one canned reply and records what it saw.
struct FakeControlPlane {
    calls: AtomicUsize,
    reply: Mutex<Option<Result<UpstreamResponse>>>,
    seen_tokens: Mutex<Vec<String>>,
    seen_ids: Mutex<Vec<String>>,
    seen_creates: Mutex<Vec<CreateSessionRequest>>,
}

impl FakeControlPlane {
    fn replying(status: u16, body: &str) -> Arc<Self> {
        Self::with(Ok(UpstreamResponse {
            status,
            body: body.into(),
        }))
    }

    fn unreachable() -> Arc<Self> {
        Self::with(Err(PortalError::Transport {
            reason: "connection refused (secret-host:9999)".into(),
        }))
    }

    fn with(reply: Result<UpstreamResponse>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(Some(reply)),
            seen_tokens: Mutex::new(Vec::new()),
            seen_ids: Mutex::new(Vec::new()),
            seen_creates: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, credential: &Credential) -> Result<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(credential.token().to_string());
        self.reply
            .lock()
            .unwrap()
            .take()
            .expect("fake control plane called more than once")
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn list_sessions(&self, credential: &Credential) -> Result<UpstreamResponse> {
        self.answer(credential)
    }

    async fn create_session(
        &self,
        credential: &Credential,
        request: &CreateSessionRequest,
    ) -> Result<UpstreamResponse> {
        self.seen_creates.lock().unwrap().push(request.clone());
        self.answer(credential)
    }

    async fn delete_session(
        &self,
        credential: &Credential,
        session_id: &str,
    ) -> Result<UpstreamResponse> {
        self.seen_ids.lock().unwrap().push(session_id.to_string());
        self.answer(credential)
    }
}

struct FakeRepos {
    fail: bool,
}

#[async_trait]
impl RepoSource for FakeRepos {
    async fn list_repos(&self, _credential: &Credential) -> Result<Vec<Repository>> {
        if self.fail {
            return Err(PortalError::Upstream {
                status: 401,
                body: "Bad credentials".into(),
            });
        }
        Ok(vec![Repository {
            id: 1,
            full_name: "acme/widgets".into(),
            owner: "acme".into(),
            name: "widgets".into(),
            description: Some("Widget factory".into()),
            private: false,
        }])
    }
}

fn app(control_plane: Arc<FakeControlPlane>) -> axum::Router {
    app_with_repos(control_plane, false)
}

fn app_with_repos(control_plane: Arc<FakeControlPlane>, repos_fail: bool) -> axum::Router {
    build_router(AppState::new(
        control_plane,
        Arc::new(FakeRepos { fail: repos_fail }),
        "claude-sonnet-4-5",
    ))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", "Bearer user-token")
}

// ── DELETE /api/sessions/:id ───────────────────────────────────

#[tokio::test]
async fn delete_without_credential_is_401_and_never_calls_upstream() {
    let cp = FakeControlPlane::replying(200, r#"{"status":"deleted"}"#);
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn delete_with_non_bearer_auth_is_401() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/abc")
        .header("authorization", "Basic dXNlcjpwdw==")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app(cp.clone()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn delete_with_undecodable_id_and_no_credential_is_401() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/%FF")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn delete_with_undecodable_id_is_json_400() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = authed("DELETE", "/api/sessions/%FF").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn delete_relays_upstream_error_text() {
    let cp = FakeControlPlane::replying(404, "not found");
    let request = authed("DELETE", "/api/sessions/abc").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not found" }));
    assert_eq!(cp.seen_ids.lock().unwrap().as_slice(), ["abc"]);
}

#[tokio::test]
async fn delete_with_empty_upstream_error_uses_generic_message() {
    let cp = FakeControlPlane::replying(502, "");
    let request = authed("DELETE", "/api/sessions/abc").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "Failed to delete session" }));
}

#[tokio::test]
async fn delete_success_relays_body_verbatim_with_caller_token() {
    let cp = FakeControlPlane::replying(200, r#"{"status":"deleted","sessionId":"abc"}"#);
    let request = authed("DELETE", "/api/sessions/abc").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "deleted", "sessionId": "abc" }));
    assert_eq!(cp.seen_tokens.lock().unwrap().as_slice(), ["user-token"]);
}

#[tokio::test]
async fn delete_transport_failure_is_generic_500() {
    let cp = FakeControlPlane::unreachable();
    let request = authed("DELETE", "/api/sessions/abc").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to delete session" }));
    assert!(!body.to_string().contains("secret-host"));
}

// ── GET /api/sessions ──────────────────────────────────────────

#[tokio::test]
async fn list_without_credential_is_401() {
    let cp = FakeControlPlane::replying(200, r#"{"sessions":[]}"#);
    let request = Request::builder()
        .uri("/api/sessions")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(cp.clone()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn list_relays_session_envelope() {
    let upstream = r#"{"sessions":[{"id":"s1","title":null,"repoOwner":"a","repoName":"b","status":"running","createdAt":1}],"hasMore":false}"#;
    let cp = FakeControlPlane::replying(200, upstream);
    let request = authed("GET", "/api/sessions").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"][0]["id"], "s1");
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn list_transport_failure_is_generic_500() {
    let cp = FakeControlPlane::unreachable();
    let request = authed("GET", "/api/sessions").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch sessions" }));
}

// ── POST /api/sessions ─────────────────────────────────────────

fn create_request(body: Value) -> Request<Body> {
    authed("POST", "/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn create_forwards_with_default_model() {
    let cp = FakeControlPlane::replying(201, r#"{"sessionId":"new-1","status":"created"}"#);
    let request = create_request(json!({ "repoOwner": "acme", "repoName": "widgets" }));

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sessionId"], "new-1");

    let seen = cp.seen_creates.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].repo_owner, "acme");
    assert_eq!(seen[0].repo_name, "widgets");
    assert_eq!(seen[0].model.as_deref(), Some("claude-sonnet-4-5"));
    assert_eq!(seen[0].title, None);
}

#[tokio::test]
async fn configured_default_model_reaches_app_state() {
    let mut config = session_portal::config::PortalConfig::default();
    config.default_model = " claude-haiku-4-5 ".into();
    assert!(config.validate().is_ok());

    let state = AppState::from_config(&config).unwrap();
    assert_eq!(state.default_model, "claude-haiku-4-5");
    assert!(session_portal::config::is_valid_model(&state.default_model));
}

#[tokio::test]
async fn create_without_repo_is_400_without_upstream_call() {
    let cp = FakeControlPlane::replying(201, "{}");
    let request = create_request(json!({ "repoOwner": "acme", "title": "x" }));

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "repoOwner and repoName are required" }));
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn create_with_unknown_model_is_400() {
    let cp = FakeControlPlane::replying(201, "{}");
    let request = create_request(json!({
        "repoOwner": "acme",
        "repoName": "widgets",
        "model": "not-a-model"
    }));

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unknown model: not-a-model" }));
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn create_with_malformed_json_is_400() {
    let cp = FakeControlPlane::replying(201, "{}");
    let request = authed("POST", "/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(cp.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(cp.calls(), 0);
}

#[tokio::test]
async fn create_checks_credential_before_body() {
    let cp = FakeControlPlane::replying(201, "{}");
    let request = Request::builder()
        .method("POST")
        .uri("/api/sessions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(app(cp), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_relays_upstream_rejection() {
    let cp = FakeControlPlane::replying(409, "Session limit reached");
    let request = create_request(json!({ "repoOwner": "acme", "repoName": "widgets" }));

    let (status, body) = send(app(cp), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Session limit reached" }));
}

// ── GET /api/repos, /api/models, /api/health ───────────────────

#[tokio::test]
async fn repos_lists_repositories() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = authed("GET", "/api/repos").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["repos"][0]["fullName"], "acme/widgets");
    assert_eq!(body["repos"][0]["private"], false);
}

#[tokio::test]
async fn repos_failure_is_generic_500() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = authed("GET", "/api/repos").body(Body::empty()).unwrap();

    let (status, body) = send(app_with_repos(cp, true), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch repositories" }));
}

#[tokio::test]
async fn repos_without_credential_is_401() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = Request::builder().uri("/api/repos").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn models_lists_catalog_with_default() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = authed("GET", "/api/models").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defaultModel"], "claude-sonnet-4-5");
    assert_eq!(body["models"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn health_needs_no_credential() {
    let cp = FakeControlPlane::replying(200, "{}");
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();

    let (status, body) = send(app(cp), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
