use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{build_router, AppState};
use crate::error::Result;

/// Serve the API on an already-bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let app = build_router(state).layer(TraceLayer::new_for_http());

    info!(addr = %listener.local_addr()?, "session portal listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("session portal stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then cancel `token`.
pub async fn wait_for_shutdown_signal(token: CancellationToken) -> std::io::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            _ = ctrl_c => {
                info!(signal = "SIGINT", "shutdown requested");
            }
            _ = sigterm.recv() => {
                info!(signal = "SIGTERM", "shutdown requested");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = ctrl_c.await {
            tracing::error!(error = %e, "Ctrl-C handler failed, shutting down anyway");
        }
    }

    token.cancel();
    Ok(())
}
