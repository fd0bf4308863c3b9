use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cli::{truncate, Connection};
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::session::feed::SessionFeed;
use crate::session::form::{CreateSessionForm, MSG_CREATE_FAILED};
use crate::session::{Session, SessionApi};

/// Print the caller's sessions, filtered and split into active/inactive.
pub async fn run_list(conn: &Connection, config: &PortalConfig, query: &str) -> Result<()> {
    let credential = conn.credential()?;
    let api: Arc<dyn SessionApi> = Arc::new(conn.client()?);

    let feed = SessionFeed::new(api, credential, config.sessions.inactive_threshold());
    feed.set_query(query);
    feed.refresh().await?;

    let view = feed.view(Utc::now());
    if view.is_empty() {
        if query.is_empty() {
            println!("No sessions yet.");
        } else {
            println!("No sessions match '{}'.", query);
        }
        return Ok(());
    }

    println!("Active");
    if view.active.is_empty() {
        println!("  (none)");
    }
    for session in &view.active {
        print_session(session);
    }

    if !view.inactive.is_empty() {
        println!("\nInactive");
        for session in &view.inactive {
            print_session(session);
        }
    }

    Ok(())
}

/// Create a session and print where it lives.
pub async fn run_create(
    conn: &Connection,
    config: &PortalConfig,
    repo: Option<&str>,
    title: Option<&str>,
    model: Option<&str>,
) -> Result<()> {
    let mut form = CreateSessionForm::new(config.effective_default_model());
    if let Some(repo) = repo {
        form.select_repo(repo);
    }
    if let Some(title) = title {
        form.set_title(title);
    }
    if let Some(model) = model {
        form.set_model(model);
    }

    // Validate locally before resolving anything network-related.
    let request = form.begin_submit()?;
    let credential = conn.credential()?;
    let client = conn.client()?;

    let outcome = client.create_session(&credential, &request).await;
    let path = match form.finish_submit(outcome) {
        Ok(path) => path,
        Err(_) => {
            return Err(PortalError::Rejected {
                message: form.error().unwrap_or(MSG_CREATE_FAILED).to_string(),
            });
        }
    };

    eprintln!(
        "session-portal: created session for {}/{}",
        request.repo_owner, request.repo_name
    );
    println!("{}", path);
    Ok(())
}

/// Delete a session by id.
pub async fn run_delete(conn: &Connection, session_id: &str) -> Result<()> {
    let credential = conn.credential()?;
    let client = conn.client()?;

    client.delete_session(&credential, session_id).await?;
    eprintln!("session-portal: deleted session {}", session_id);
    Ok(())
}

fn print_session(session: &Session) {
    let when = session
        .effective_time()
        .map(|t: DateTime<Utc>| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "  {}  {}  [{}]  {}  ({})",
        session.id,
        truncate(&session.display_title(), 60),
        session.status,
        when,
        session.repo_full_name(),
    );
}
