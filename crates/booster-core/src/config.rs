//! Configuration system for Booster.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $BOOSTER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/booster/config.toml
//!   3. ~/.config/booster/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    pub endpoint: EndpointConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Well-known path of the daemon's socket.
    pub socket_path: PathBuf,
    /// Permission bits applied to the socket after bind.
    pub mode: u32,
    /// Uids allowed to submit requests. Empty = anyone who can open the socket.
    pub allowed_uids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Refuse thread ids that are not a multiple of 4 before sending.
    /// Advisory only; the daemon never relies on it.
    pub require_aligned_tid: bool,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_SOCKET_PATH: &str = "/run/booster.sock";
pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            mode: DEFAULT_SOCKET_MODE,
            allowed_uids: Vec::new(),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("booster")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl BoosterConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::file_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific file, or defaults if it does not exist. No env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(BoosterConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("BOOSTER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        Self::write_default_to(&path)?;
        Ok(path)
    }

    /// Write default config to `path` unless something is already there.
    pub fn write_default_to(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text =
            toml::to_string_pretty(&BoosterConfig::default()).map_err(ConfigError::SerializeFailed)?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))
    }

    /// Apply BOOSTER_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("BOOSTER_ENDPOINT__SOCKET_PATH") {
            self.endpoint.socket_path = PathBuf::from(v);
        }
        if let Some(v) = var("BOOSTER_ENDPOINT__MODE") {
            if let Some(mode) = parse_mode(&v) {
                self.endpoint.mode = mode;
            }
        }
        if let Some(v) = var("BOOSTER_CLIENT__REQUIRE_ALIGNED_TID") {
            self.client.require_aligned_tid = v == "true" || v == "1";
        }
    }
}

/// Octal permission bits, with or without a `0o` prefix.
fn parse_mode(text: &str) -> Option<u32> {
    let digits = text.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8).ok().filter(|m| *m <= 0o777)
}
