//! Settings and configuration utilities.
//!
//! Settings are read from $HOME/.gh-contrib/settings.json and serve as a
//! fallback for environment variables, so a token or endpoint can be kept
//! out of the shell environment.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Environment variables consulted for a GitHub token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Settings loaded from $HOME/.gh-contrib/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path; a missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".gh-contrib").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }

    /// Picks the explicit token, falling back to the token variables.
    ///
    /// Blank values count as unset at every step.
    pub fn resolve_token(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                TOKEN_ENV_VARS
                    .iter()
                    .filter_map(|key| self.get_env_var(key))
                    .find(|token| !token.trim().is_empty())
            })
    }
}

/// Returns an environment variable with fallback to settings.
pub fn get_env_var(key: &str) -> Result<String> {
    match Settings::load() {
        Ok(settings) => settings
            .get_env_var(key)
            .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {key}")),
        Err(err) => env::var(key)
            .map_err(|_| anyhow::anyhow!("Environment variable not found: {key}").context(err)),
    }
}

/// Tries multiple environment variables with fallback to settings.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {keys:?}"))
}

/// Picks the explicit token, falling back to the environment and settings.
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    let settings = Settings::load().unwrap_or_else(|err| {
        warn!("Ignoring settings file: {err:#}");
        Settings::default()
    });
    settings.resolve_token(explicit)
}
