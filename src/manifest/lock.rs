//! Manifest lock protocol.
//!
//! Mutual exclusion between concurrent CLI processes is a marker file next
//! to the manifest: whoever creates it holds the lock. Existence plus
//! modification time is the entire protocol; the JSON holder payload inside
//! is informational only. A marker older than the staleness threshold is
//! assumed abandoned (crashed process) and broken.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SgError};

/// Tuning for the acquire retry loop.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Maximum create attempts before giving up with a contention error.
    pub max_attempts: u32,
    /// Sleep between attempts while the marker is held and fresh.
    pub backoff: Duration,
    /// Marker age beyond which the holder is assumed dead.
    pub stale_after: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            backoff: Duration::from_millis(100),
            stale_after: Duration::from_secs(30),
        }
    }
}

/// Informational payload written into the marker file.
#[derive(Debug, Serialize, Deserialize)]
struct LockHolder {
    pid: u32,
    acquired_at: chrono::DateTime<Utc>,
}

/// An acquired manifest lock. Released explicitly via [`ManifestLock::release`]
/// or best-effort on drop.
#[derive(Debug)]
pub struct ManifestLock {
    path: PathBuf,
    released: bool,
}

impl ManifestLock {
    /// Acquire the lock at `path`, retrying against a live holder and
    /// breaking a stale one.
    ///
    /// Only `AlreadyExists` on the create is treated as contention; any
    /// other creation failure (permissions, missing parent) is fatal and
    /// surfaced as [`SgError::LockFailed`] immediately.
    pub fn acquire(path: &Path, config: &LockConfig) -> Result<Self> {
        for attempt in 0..config.max_attempts {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    let holder = LockHolder {
                        pid: std::process::id(),
                        acquired_at: Utc::now(),
                    };
                    // Marker content is informational; a write failure does
                    // not invalidate the lock we already hold.
                    if let Ok(json) = serde_json::to_string(&holder) {
                        let _ = file.write_all(json.as_bytes());
                    }
                    debug!(path = %path.display(), attempt, "acquired manifest lock");
                    return Ok(Self {
                        path: path.to_path_buf(),
                        released: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Self::is_stale(path, config.stale_after) {
                        warn!(path = %path.display(), "breaking stale manifest lock");
                        match fs::remove_file(path) {
                            Ok(()) => {}
                            Err(e) if e.kind() == ErrorKind::NotFound => {}
                            Err(e) => {
                                return Err(SgError::LockFailed(format!(
                                    "remove stale lock {}: {e}",
                                    path.display()
                                )));
                            }
                        }
                        // Immediately retry the create; another process may
                        // still win the race, which loops us back here.
                        continue;
                    }
                    std::thread::sleep(config.backoff);
                }
                Err(e) => {
                    return Err(SgError::LockFailed(format!(
                        "create lock {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        Err(SgError::LockTimeout(format!(
            "manifest lock {} still held after {} attempts",
            path.display(),
            config.max_attempts
        )))
    }

    /// Whether the marker at `path` is older than `stale_after`.
    ///
    /// A marker that vanished between the failed create and this check is
    /// reported as not stale; the caller's retry loop will re-attempt the
    /// create and win or lose the race normally.
    fn is_stale(path: &Path, stale_after: Duration) -> bool {
        let Ok(meta) = fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        match modified.elapsed() {
            Ok(age) => age > stale_after,
            // Marker mtime in the future (clock skew): treat as fresh.
            Err(_) => false,
        }
    }

    /// Release the lock. A marker that is already gone is not an error.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "released manifest lock");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SgError::LockFailed(format!(
                "remove lock {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(e) = fs::remove_file(&self.path) {
                if e.kind() != ErrorKind::NotFound {
                    debug!(path = %self.path.display(), "failed to release lock on drop: {e}");
                }
            }
        }
    }
}
