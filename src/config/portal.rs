use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::models::{is_valid_model, DEFAULT_MODEL};
use crate::error::{PortalError, Result};

/// Top-level portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the control plane lives and how long to wait for it.
    #[serde(default)]
    pub control_plane: ControlPlaneConfig,

    /// Code-hosting API used to list repositories.
    #[serde(default)]
    pub github: GithubConfig,

    /// Session list presentation.
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Model id used when a creation request names none.
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            control_plane: ControlPlaneConfig::default(),
            github: GithubConfig::default(),
            sessions: SessionsConfig::default(),
            default_model: default_model(),
        }
    }
}

impl PortalConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|e| PortalError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate().map_err(|reason| PortalError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Check values serde accepts but the portal cannot use.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let hours = self.sessions.inactive_after_hours;
        if hours > MAX_INACTIVE_HOURS {
            return Err(format!(
                "sessions.inactive_after_hours must be at most {MAX_INACTIVE_HOURS}, got {hours}"
            ));
        }
        let model = self.default_model.trim();
        if !model.is_empty() && !is_valid_model(model) {
            return Err(format!("default_model: unknown model {model}"));
        }
        Ok(())
    }

    /// Resolve the config file to use. Checks, in order:
    /// 1. An explicit path
    /// 2. `.session-portal/config.yml` under `project_root`
    /// 3. `~/.config/session-portal/config.yml`
    ///
    /// Environment overrides are applied on top of whatever was loaded.
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(PortalError::ConfigParse {
                        path: path.to_path_buf(),
                        reason: "file not found".into(),
                    });
                }
                Self::load_from(path)?
            }
            None => {
                let project = project_config_path(project_root);
                if project.exists() {
                    Self::load_from(&project)?
                } else {
                    Self::load_from(&super::dirs_global().join("config.yml"))?
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `CONTROL_PLANE_URL` and `SESSION_PORTAL_BIND` if set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CONTROL_PLANE_URL") {
            if !url.trim().is_empty() {
                self.control_plane.base_url = url;
            }
        }
        if let Ok(bind) = std::env::var("SESSION_PORTAL_BIND") {
            if !bind.trim().is_empty() {
                self.server.bind = bind;
            }
        }
    }

    /// Model id to use for creation requests, falling back to the catalog default.
    pub fn effective_default_model(&self) -> &str {
        let model = self.default_model.trim();
        if model.is_empty() {
            DEFAULT_MODEL
        } else {
            model
        }
    }
}

/// `.session-portal/config.yml` under a project root.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".session-portal").join("config.yml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on. Default: 127.0.0.1:3000.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    #[serde(default = "default_control_plane_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_control_plane_url() -> String {
    "http://127.0.0.1:8787".into()
}
fn default_timeout() -> u64 {
    30
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: default_control_plane_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ControlPlaneConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_url")]
    pub api_base_url: String,

    /// Page size for repository listing. Default: 100.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_github_url() -> String {
    "https://api.github.com".into()
}
fn default_per_page() -> u32 {
    100
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_github_url(),
            per_page: default_per_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Sessions untouched for longer than this are listed as inactive. Default: 168 (7 days).
    #[serde(default = "default_inactive_hours")]
    pub inactive_after_hours: u64,
}

/// Upper bound for `inactive_after_hours`: 100 years.
pub const MAX_INACTIVE_HOURS: u64 = 100 * 365 * 24;

fn default_inactive_hours() -> u64 {
    168
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            inactive_after_hours: default_inactive_hours(),
        }
    }
}

impl SessionsConfig {
    /// Values past `MAX_INACTIVE_HOURS` are rejected at load; anything that
    /// still overflows saturates.
    pub fn inactive_threshold(&self) -> chrono::Duration {
        i64::try_from(self.inactive_after_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }
}
