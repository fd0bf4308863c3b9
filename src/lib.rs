pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod github;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
