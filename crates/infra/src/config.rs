//! Store configuration loading.
//!
//! Values come from environment variables; anything unset falls back to a
//! default suitable for a single local user.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const ENV_BACKEND: &str = "STOCKROOM_BACKEND";
pub const ENV_DATA_DIR: &str = "STOCKROOM_DATA_DIR";
pub const ENV_SLOT: &str = "STOCKROOM_SLOT";

/// Storage slot used when none is configured.
pub const DEFAULT_SLOT: &str = "inventory";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown storage backend {0:?} (expected \"file\" or \"memory\")")]
    UnknownBackend(String),

    #[error("could not resolve a data directory; set STOCKROOM_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Backend {
    /// One JSON file per slot under `data_dir`.
    File,
    /// Process-local; nothing survives a restart.
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Backend::File),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub slot: String,
}

impl StoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (keeps tests off the real environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match non_empty(ENV_BACKEND) {
            Some(raw) => raw.parse()?,
            None => Backend::File,
        };

        let data_dir = match non_empty(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let slot = non_empty(ENV_SLOT).unwrap_or_else(|| DEFAULT_SLOT.to_string());

        Ok(Self {
            backend,
            data_dir,
            slot,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

/// Resolve `{app_data_dir}/stockroom`.
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;

    Ok(base.join("stockroom"))
}
