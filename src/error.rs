//! Error handling for sg.
//!
//! One enum for every failure the crate can surface, with distinct variants
//! for the recoverability classes callers care about: lock contention,
//! storage failures, lookups that found nothing, content-resolution
//! failures, and malformed skill input.

use std::io;

use thiserror::Error;

/// Main error type for sg operations.
#[derive(Error, Debug)]
pub enum SgError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Lock could not be acquired within the retry budget. Recoverable by
    /// retrying later; never auto-retried beyond the budget.
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// Lock file creation failed for a reason other than contention
    /// (permissions, read-only filesystem). Fatal to the operation.
    #[error("Lock failed: {0}")]
    LockFailed(String),

    /// Filesystem read/write/rename on the manifest failed.
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Pack not found: {0}")]
    PackNotFound(String),

    /// A supplied path contained traversal/escape sequences. Rejected
    /// before any filesystem access.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A content source could not be turned into a fetchable location, or a
    /// fetch did not succeed. Carries the attempted URL or reason so the
    /// caller can supply a manual override.
    #[error("Content resolution failed: {0}")]
    Resolution(String),

    #[error("Invalid skill format: {0}")]
    InvalidSkill(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SgError>;

impl SgError {
    /// Whether the caller could reasonably retry the whole operation later.
    #[must_use]
    pub fn is_contention(&self) -> bool {
        matches!(self, SgError::LockTimeout(_))
    }

    /// Whether this is a "nothing was found" outcome rather than a fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SgError::SkillNotFound(_) | SgError::PackNotFound(_))
    }
}
