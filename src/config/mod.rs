//! Host configuration.
//!
//! Loaded from `config.toml` in the data directory when present; every field
//! has a default, and the CLI's env-enabled flags override the file.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTOSAVE_QUIET_MS: u64 = 800;
const DEFAULT_PRUNE_DAYS: u32 = 30;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory holding `config.toml` and the SQLite database.
    pub data_dir: PathBuf,
    /// Quiet period before a deferred save fires, in milliseconds.
    pub autosave_quiet_ms: u64,
    /// Projects untouched this many days are eligible for pruning (0 = never).
    pub prune_days: u32,
    /// Log level (trace, debug, info, warn, error).
    pub log: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            autosave_quiet_ms: DEFAULT_AUTOSAVE_QUIET_MS,
            prune_days: DEFAULT_PRUNE_DAYS,
            log: "info".to_string(),
        }
    }
}

impl HostConfig {
    /// Load the config for `data_dir` (or the default location), merging in
    /// `config.toml` when it exists.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let dir = data_dir.unwrap_or_else(default_data_dir);
        let path = dir.join("config.toml");
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.data_dir = dir;
        Ok(config)
    }

    pub fn autosave_quiet(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/share/builderd")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
