//! Runtime settings
//!
//! Resolved once at startup from flags and environment and passed by reference to every
//! operation.

use std::fs;
use std::path::PathBuf;

use crate::error::{CorralError, Result};

/// Directory name under the platform config directory
const CONFIG_DIR: &str = "corral";

/// Plugins subdirectory of the config directory
const PLUGINS_DIR: &str = "plugins";

/// Additional, read-only plugin root
pub const EXTRA_PLUGIN_DIR_ENV: &str = "CORRAL_EXTRA_PLUGIN_DIRECTORY";

/// Release host API base URL
pub const GITHUB_API_URL_ENV: &str = "CORRAL_GITHUB_API_URL";

/// Tokens for the release host, in lookup order
pub const GITHUB_TOKEN_ENVS: &[&str] = &["CORRAL_GITHUB_TOKEN", "GITHUB_TOKEN"];

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where plugins are installed
    pub plugin_dir: PathBuf,
    /// Scanned in addition to `plugin_dir`, never installed into
    pub extra_plugin_dir: Option<PathBuf>,
    pub github_api_url: String,
    pub github_token: Option<String>,
}

impl Settings {
    /// Resolve settings from the process environment
    ///
    /// `plugin_dir` is the `--plugin-dir` flag (clap already folds in `CORRAL_PLUGIN_DIR`).
    pub fn resolve(plugin_dir: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(plugin_dir, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `env` to read environment variables
    pub fn resolve_with(
        plugin_dir: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let plugin_dir = match plugin_dir {
            Some(dir) => dir,
            None => default_plugin_dir()?,
        };

        Ok(Self {
            plugin_dir,
            extra_plugin_dir: non_empty(EXTRA_PLUGIN_DIR_ENV).map(PathBuf::from),
            github_api_url: non_empty(GITHUB_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            github_token: GITHUB_TOKEN_ENVS.iter().find_map(|key| non_empty(*key)),
        })
    }

    /// Plugin roots to scan, installation root first
    pub fn plugin_roots(&self) -> Vec<PathBuf> {
        std::iter::once(self.plugin_dir.clone())
            .chain(self.extra_plugin_dir.clone())
            .collect()
    }

    /// Create the plugin directory if it does not exist
    pub fn ensure_plugin_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.plugin_dir).map_err(|e| CorralError::PluginDirUnavailable {
            reason: format!("{}: {e}", self.plugin_dir.display()),
        })
    }
}

/// `<platform config dir>/corral/plugins`
pub fn default_plugin_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| CorralError::PluginDirUnavailable {
        reason: "Could not determine config directory".to_string(),
    })?;
    Ok(base.join(CONFIG_DIR).join(PLUGINS_DIR))
}
