//! Configuration.
//!
//! Defaults work out of the box; a TOML file can override any section.
//! Precedence: `--config` flag, then `SG_CONFIG`, then the global
//! `~/.config/sg/config.toml`. Values merge patch-style over the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SgError};
use crate::manifest::LockConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub lock: LockSettings,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory for the manifest, lock marker, and local database.
    /// Defaults to `~/.sg`; `SG_DATA_DIR` overrides both.
    #[serde(default)]
    pub data_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSettings {
    #[serde(default = "default_lock_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_lock_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_lock_stale_secs")]
    pub stale_secs: u64,
}

fn default_lock_attempts() -> u32 {
    50
}
fn default_lock_backoff_ms() -> u64 {
    100
}
fn default_lock_stale_secs() -> u64 {
    30
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_lock_attempts(),
            backoff_ms: default_lock_backoff_ms(),
            stale_secs: default_lock_stale_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Registry namespace bundled skills are resolved under:
    /// identity = `<namespace>/<declared-name>`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "anthropics".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for a single content fetch. A fetch that exceeds it fails;
    /// it is never retried.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration with the documented precedence.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SG_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            // An explicitly named file must exist and parse.
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                SgError::Config(format!("read config {}: {e}", path.display()))
            })?;
            return toml::from_str(&raw)
                .map_err(|e| SgError::Config(format!("parse config {}: {e}", path.display())));
        }

        let Some(global) = dirs::config_dir().map(|d| d.join("sg").join("config.toml")) else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(&global) {
            Ok(raw) => toml::from_str(&raw)
                .map_err(|e| SgError::Config(format!("parse config {}: {e}", global.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SgError::Config(format!(
                "read config {}: {e}",
                global.display()
            ))),
        }
    }

    /// Effective data root: `SG_DATA_DIR` env, then `paths.data_root`, then
    /// `~/.sg`.
    pub fn data_root(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("SG_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.paths.data_root {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".sg"))
            .ok_or_else(|| SgError::Config("cannot determine home directory".to_string()))
    }

    /// Lock tuning as the lock module consumes it.
    #[must_use]
    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            max_attempts: self.lock.max_attempts,
            backoff: Duration::from_millis(self.lock.backoff_ms),
            stale_after: Duration::from_secs(self.lock.stale_secs),
        }
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }
}
