//! Configuration management for hgsync
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (HGSYNC_*)
//! 3. Config file (~/.config/hgsync/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings for the `hg` executable
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HgConfig {
    /// Path to the hg executable
    pub executable: String,
}

impl Default for HgConfig {
    fn default() -> Self {
        Self {
            executable: "hg".to_string(),
        }
    }
}

/// Default cleanup behaviour when the caller does not say otherwise
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncDefaults {
    /// Discard uncommitted local modifications before pulling
    pub force: bool,

    /// Delete untracked files before pulling
    pub purge: bool,
}

impl Default for SyncDefaults {
    fn default() -> Self {
        Self {
            force: true,
            purge: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// hg executable configuration
    pub hg: HgConfig,

    /// Cleanup defaults
    pub defaults: SyncDefaults,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/hgsync/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hgsync").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - HGSYNC_HG_PATH: Path to hg executable
    /// - HGSYNC_FORCE: Discard local modifications (true/false)
    /// - HGSYNC_PURGE: Delete untracked files (true/false)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(hg_path) = std::env::var("HGSYNC_HG_PATH") {
            self.hg.executable = hg_path;
        }

        if let Some(force) = std::env::var("HGSYNC_FORCE").ok().and_then(|v| parse_bool(&v)) {
            self.defaults.force = force;
        }

        if let Some(purge) = std::env::var("HGSYNC_PURGE").ok().and_then(|v| parse_bool(&v)) {
            self.defaults.purge = purge;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        executable: Option<String>,
        force: Option<bool>,
        purge: Option<bool>,
    ) -> Self {
        if let Some(path) = executable {
            self.hg.executable = path;
        }

        if let Some(f) = force {
            self.defaults.force = f;
        }

        if let Some(p) = purge {
            self.defaults.purge = p;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        executable: Option<String>,
        force: Option<bool>,
        purge: Option<bool>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(executable, force, purge))
    }
}

/// Parse yes/no style booleans from the environment
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
