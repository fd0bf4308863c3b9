use crate::cli::{truncate, Connection};
use crate::config::{PortalConfig, MODEL_OPTIONS};
use crate::error::Result;

/// List repositories available for new sessions.
pub async fn run_repos(conn: &Connection) -> Result<()> {
    let credential = conn.credential()?;
    let repos = conn.client()?.list_repos(&credential).await?;

    if repos.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    for repo in &repos {
        println!(
            "{}{}  {}",
            repo.full_name,
            if repo.private { " (private)" } else { "" },
            truncate(repo.description.as_deref().unwrap_or(""), 70),
        );
    }
    println!("\n{} repositories", repos.len());
    Ok(())
}

/// Print the model catalog. Local; needs no credential.
pub fn run_models(config: &PortalConfig) -> Result<()> {
    let default = config.effective_default_model();
    for model in MODEL_OPTIONS {
        let marker = if model.id == default { "*" } else { " " };
        println!("{} {:<20} {:<20} {}", marker, model.id, model.name, model.description);
    }
    Ok(())
}
