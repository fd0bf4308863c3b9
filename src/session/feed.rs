use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::session::reconcile::{reconcile, SessionView};
use crate::session::{Credential, Session, SessionApi};

/// Result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache now holds this many sessions.
    Updated(usize),
    /// A newer refresh (or `cancel`) superseded this one; the response was dropped.
    Stale,
}

/// Read-only cached copy of the caller's sessions, refreshed on demand.
///
/// Every refresh supersedes the one before it: the earlier fetch's token is
/// cancelled, and a cancelled fetch never writes to the cache.
pub struct SessionFeed {
    api: Arc<dyn SessionApi>,
    credential: Credential,
    threshold: Duration,
    sessions: RwLock<Vec<Session>>,
    query: RwLock<String>,
    current: Mutex<CancellationToken>,
}

impl SessionFeed {
    pub fn new(api: Arc<dyn SessionApi>, credential: Credential, threshold: Duration) -> Self {
        Self {
            api,
            credential,
            threshold,
            sessions: RwLock::new(Vec::new()),
            query: RwLock::new(String::new()),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    /// Fetch the session list, superseding any refresh still in flight.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let token = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            current.cancel();
            let next = CancellationToken::new();
            *current = next.clone();
            next
        };

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("session refresh superseded before completion");
                return Ok(RefreshOutcome::Stale);
            }
            result = self.api.list_sessions(&self.credential) => result,
        };

        // Hold the token lock while publishing so a concurrent refresh
        // can't cancel between the check and the write.
        let _current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if token.is_cancelled() {
            return Ok(RefreshOutcome::Stale);
        }

        let sessions = fetched?;
        let count = sessions.len();
        *self.sessions.write().unwrap_or_else(|e| e.into_inner()) = sessions;
        Ok(RefreshOutcome::Updated(count))
    }

    /// Drop whatever refresh is in flight.
    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.cancel();
    }

    pub fn set_query(&self, query: impl Into<String>) {
        *self.query.write().unwrap_or_else(|e| e.into_inner()) = query.into();
    }

    pub fn query(&self) -> String {
        self.query.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot of the cached sessions, in fetch order.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Reconciled view of the cache under the current query.
    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        let query = self.query.read().unwrap_or_else(|e| e.into_inner());
        reconcile(&sessions, &query, now, self.threshold)
    }

    /// Delete a session upstream, then drop it from the cache.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.api.delete_session(&self.credential, session_id).await?;
        self.remove(session_id);
        Ok(())
    }

    /// Drop a session from the cache without a network call.
    pub fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        sessions.len() != before
    }
}
