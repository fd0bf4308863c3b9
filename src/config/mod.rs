pub mod models;
pub mod portal;

pub use models::*;
pub use portal::*;

use std::path::PathBuf;

/// Returns the global config directory path: `~/.config/session-portal/`
pub fn dirs_global() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("session-portal")
}
