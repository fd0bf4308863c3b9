use crate::config::DEFAULT_MODEL;
use crate::error::{PortalError, Result};
use crate::session::{session_path, CreateSessionRequest, CreatedSession, Credential, SessionApi};

pub const MSG_SELECT_REPO: &str = "Please select a repository";
pub const MSG_REPO_FORMAT: &str = "Repository must be in owner/name form";
pub const MSG_IN_PROGRESS: &str = "A submission is already in progress";
pub const MSG_CREATE_FAILED: &str = "Failed to create session";

/// Where the new-session form is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    /// Creation succeeded; the caller should show `path`.
    Navigated { session_id: String, path: String },
}

/// The new-session form: repository, optional title, model.
#[derive(Debug, Clone)]
pub struct CreateSessionForm {
    selected_repo: Option<String>,
    title: String,
    model: String,
    default_model: String,
    state: FormState,
    error: Option<String>,
}

impl Default for CreateSessionForm {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl CreateSessionForm {
    pub fn new(default_model: impl Into<String>) -> Self {
        let default_model = default_model.into();
        Self {
            selected_repo: None,
            title: String::new(),
            model: default_model.clone(),
            default_model,
            state: FormState::Idle,
            error: None,
        }
    }

    /// Select a repository by its `owner/name`.
    pub fn select_repo(&mut self, full_name: impl Into<String>) {
        self.selected_repo = Some(full_name.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// Validation failures leave the form idle with an error message and
    /// never touch the network.
    pub fn begin_submit(&mut self) -> Result<CreateSessionRequest> {
        if self.state == FormState::Submitting {
            return Err(PortalError::validation(MSG_IN_PROGRESS));
        }

        let selected = self
            .selected_repo
            .as_deref()
            .map(str::trim)
            .filter(|repo| !repo.is_empty())
            .map(String::from);
        let Some(selected) = selected else {
            return Err(self.reject(MSG_SELECT_REPO));
        };

        let (owner, name) = match selected.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                (owner.to_string(), name.to_string())
            }
            _ => return Err(self.reject(MSG_REPO_FORMAT)),
        };

        let title = self.title.trim();
        let model = match self.model.trim() {
            "" => match self.default_model.trim() {
                "" => DEFAULT_MODEL.to_string(),
                default => default.to_string(),
            },
            model => model.to_string(),
        };

        self.error = None;
        self.state = FormState::Submitting;

        Ok(CreateSessionRequest {
            repo_owner: owner,
            repo_name: name,
            title: (!title.is_empty()).then(|| title.to_string()),
            model: Some(model),
        })
    }

    /// Apply the outcome of a creation request.
    ///
    /// On success returns the detail path to navigate to. On failure the
    /// form goes back to idle so it can be resubmitted.
    pub fn finish_submit(&mut self, outcome: Result<CreatedSession>) -> Result<String> {
        match outcome {
            Ok(created) => {
                let path = session_path(&created.session_id);
                self.error = None;
                self.state = FormState::Navigated {
                    session_id: created.session_id,
                    path: path.clone(),
                };
                Ok(path)
            }
            Err(e) => {
                let message = match &e {
                    PortalError::Upstream { body, .. } if !body.trim().is_empty() => body.clone(),
                    _ => MSG_CREATE_FAILED.to_string(),
                };
                tracing::debug!(error = %e, "session creation failed");
                self.error = Some(message);
                self.state = FormState::Idle;
                Err(e)
            }
        }
    }

    /// Validate, post, and apply the result.
    pub async fn submit(&mut self, api: &dyn SessionApi, credential: &Credential) -> Result<String> {
        let request = self.begin_submit()?;
        let outcome = api.create_session(credential, &request).await;
        self.finish_submit(outcome)
    }

    fn reject(&mut self, message: &str) -> PortalError {
        self.error = Some(message.to_string());
        PortalError::validation(message)
    }
}
