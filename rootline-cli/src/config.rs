//! Configuration for the rootline CLI
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. TOML file (`--config`, else `<config_dir>/rootline/config.toml` if present)
//! 3. environment (`ROOTLINE_ALGORITHM`, `ROOTLINE_TARGET_ROOT`, `ROOTLINE_MATCH_MODE`,
//!    `ROOTLINE_LOG`, falling back to `RUST_LOG`)
//! 4. command-line flags

use rootline_merkle::{Digest, HashAlgorithm, MatchMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const CONFIG_DIR: &str = "rootline";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Hash algorithm for leaves and parents
    pub algorithm: HashAlgorithm,

    /// Root digest `find` searches for when `--target` is not given
    pub target_root: Option<String>,

    /// How roots are compared against the target
    pub match_mode: MatchMode,

    /// Log filter directive (tracing-subscriber EnvFilter syntax)
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            target_root: None,
            match_mode: MatchMode::IgnoreCase,
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load defaults, the config file and the process environment.
    ///
    /// An explicit `path` must exist. The default path is used only when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ROOTLINE_ALGORITHM") {
            self.algorithm = value.parse().map_err(|e| ConfigError::InvalidValue {
                key: "ROOTLINE_ALGORITHM".to_string(),
                reason: format!("{}", e),
            })?;
        }

        if let Some(value) = lookup("ROOTLINE_TARGET_ROOT") {
            if !value.trim().is_empty() {
                self.target_root = Some(value.trim().to_string());
            }
        }

        if let Some(value) = lookup("ROOTLINE_MATCH_MODE") {
            self.match_mode = value.parse().map_err(|e| ConfigError::InvalidValue {
                key: "ROOTLINE_MATCH_MODE".to_string(),
                reason: format!("{}", e),
            })?;
        }

        if let Some(value) = lookup("ROOTLINE_LOG").or_else(|| lookup("RUST_LOG")) {
            self.log_level = value;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(target) = &self.target_root {
            Digest::from_hex(target).map_err(|e| ConfigError::InvalidValue {
                key: "target_root".to_string(),
                reason: e.to_string(),
            })?;
        }

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        EnvFilter::try_new(&self.log_level).map_err(|e| ConfigError::InvalidValue {
            key: "log_level".to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
