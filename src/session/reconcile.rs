use chrono::{DateTime, Duration, Utc};

use crate::session::Session;

/// Sessions split by recency, each sorted newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub active: Vec<Session>,
    pub inactive: Vec<Session>,
}

impl SessionView {
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }
}

/// Case-insensitive substring match on the title or `owner/name`.
/// An empty query matches everything.
pub fn matches_query(session: &Session, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let title_hit = session
        .title
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(&needle));
    title_hit || session.repo_full_name().to_lowercase().contains(&needle)
}

/// A session is inactive once its effective timestamp is older than `threshold`.
pub fn is_inactive_session(session: &Session, now: DateTime<Utc>, threshold: Duration) -> bool {
    let cutoff = now
        .timestamp_millis()
        .saturating_sub(threshold.num_milliseconds());
    session.effective_timestamp() < cutoff
}

/// Filter by `query`, sort newest first, then partition into active/inactive.
///
/// Pure in its inputs: the clock is passed in. The sort is stable, so
/// sessions with equal timestamps keep their input order.
pub fn reconcile(
    sessions: &[Session],
    query: &str,
    now: DateTime<Utc>,
    threshold: Duration,
) -> SessionView {
    let mut filtered: Vec<Session> = sessions
        .iter()
        .filter(|s| matches_query(s, query))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| b.effective_timestamp().cmp(&a.effective_timestamp()));

    let (inactive, active): (Vec<Session>, Vec<Session>) = filtered
        .into_iter()
        .partition(|s| is_inactive_session(s, now, threshold));

    SessionView { active, inactive }
}
