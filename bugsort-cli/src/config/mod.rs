//! Front-end settings loaded from a TOML file
//!
//! Looked up at `$BUGSORT_CONFIG`, then `<config_dir>/bugsort/config.toml`.
//! A missing file means defaults; every key is optional and unknown keys
//! are rejected. The 10 MiB upload ceiling is fixed and not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;
use crate::session::config::DEFAULT_SUCCESS_BANNER_TTL;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "BUGSORT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Colored terminal output
    pub color: bool,
    /// Where sorted files go when `--output-dir` is not given
    pub output_dir: Option<PathBuf>,
    pub success_banner_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            color: true,
            output_dir: None,
            success_banner_secs: DEFAULT_SUCCESS_BANNER_TTL.as_secs(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bugsort")
            .join("config.toml")
    }

    /// Load from `path`, or from [`Config::default_path`] when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path(),
        };

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!(
                "log_level must be one of off, error, warn, info, debug, trace (got '{}')",
                self.log_level
            );
        }
        Ok(())
    }

    /// Limits for a sort session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::builder()
            .success_banner_ttl(Duration::from_secs(self.success_banner_secs))
            .build()
    }
}
