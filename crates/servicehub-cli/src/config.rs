//! # Configuration Persistence
//!
//! Save and load CLI settings to/from disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use servicehub_session::AppFlavor;

/// Backend URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the ServiceHub backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// App to act as when `--app` is not given.
    #[serde(default)]
    pub app: AppFlavor,

    /// Session file override; defaults to the per-flavor config location.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            app: AppFlavor::default(),
            session_file: None,
        }
    }
}

impl CliConfig {
    /// Returns the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("servicehub").join("config.json"))
    }

    /// Loads configuration from `path`, or returns defaults if it is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!(?path, "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write config {}", path.display()))?;

        tracing::info!(?path, "Saved configuration");
        Ok(())
    }

    /// Session file for `flavor`: the configured override, else the
    /// per-flavor default.
    pub fn session_path(&self, flavor: AppFlavor) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(|| flavor.default_session_path())
    }
}
