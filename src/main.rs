use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use session_portal::cli::{self, Connection};
use session_portal::config::PortalConfig;

#[derive(Parser)]
#[command(name = "session-portal", version, about = "Session API proxy and client")]
struct Cli {
    /// Config file (default: .session-portal/config.yml, then ~/.config/session-portal/config.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Portal base URL for client commands
    #[arg(
        long,
        global = true,
        env = "SESSION_PORTAL_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    portal_url: String,

    /// Bearer token for client commands
    #[arg(long, global = true, env = "SESSION_PORTAL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API proxy
    Serve {
        /// Listen address, overrides config
        #[arg(long)]
        bind: Option<String>,
    },
    /// List, create, or delete sessions
    Sessions {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// List repositories available for new sessions
    Repos,
    /// Show the model catalog
    Models,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List sessions, newest first, split into active and inactive
    List {
        /// Case-insensitive filter on title or owner/name
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Create a session
    Create {
        /// Repository as owner/name
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Delete a session
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Serve { .. } => "session_portal=info,tower_http=info",
        _ => "session_portal=warn",
    };
    session_portal::init_logging(default_filter);

    if let Err(e) = run(cli).await {
        eprintln!("session-portal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config =
        PortalConfig::load(cli.config.as_deref(), &cwd).context("failed to load config")?;

    let conn = Connection {
        portal_url: cli.portal_url,
        token: cli.token,
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            cli::serve::run_serve(&config).await?;
        }
        Commands::Sessions { action } => match action {
            SessionCommands::List { query } => {
                cli::sessions::run_list(&conn, &config, &query).await?;
            }
            SessionCommands::Create { repo, title, model } => {
                cli::sessions::run_create(
                    &conn,
                    &config,
                    repo.as_deref(),
                    title.as_deref(),
                    model.as_deref(),
                )
                .await?;
            }
            SessionCommands::Delete { id } => {
                cli::sessions::run_delete(&conn, &id).await?;
            }
        },
        Commands::Repos => cli::repos::run_repos(&conn).await?,
        Commands::Models => cli::repos::run_models(&config)?,
    }

    Ok(())
}
