pub mod repos;
pub mod serve;
pub mod sessions;

use crate::client::PortalClient;
use crate::error::{PortalError, Result};
use crate::session::Credential;

/// Where the portal is and who is calling it.
#[derive(Debug, Clone)]
pub struct Connection {
    pub portal_url: String,
    pub token: Option<String>,
}

impl Connection {
    pub fn client(&self) -> Result<PortalClient> {
        PortalClient::new(&self.portal_url)
    }

    /// The caller's credential. Missing or blank tokens fail before any I/O.
    pub fn credential(&self) -> Result<Credential> {
        self.token
            .as_deref()
            .and_then(Credential::bearer)
            .ok_or(PortalError::Unauthorized)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
