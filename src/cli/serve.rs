use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::server::{serve, wait_for_shutdown_signal};
use crate::api::AppState;
use crate::config::PortalConfig;
use crate::error::Result;

/// Run the API proxy until SIGINT/SIGTERM.
pub async fn run_serve(config: &PortalConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let listener = TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        control_plane = %config.control_plane.base_url,
        "proxying sessions to control plane"
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal(signal_token.clone()).await {
            tracing::error!(error = %e, "signal handler failed, shutting down");
            signal_token.cancel();
        }
    });

    serve(listener, state, shutdown).await
}
