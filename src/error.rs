use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// A failed submission, already reduced to the message shown to the user.
    #[error("{message}")]
    Rejected { message: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PortalError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        Self::transport(e)
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
