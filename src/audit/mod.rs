//! Pack drift auditing.
//!
//! Walks a pack's bundled skills, resolves each declared version against
//! the registry version ledger, and classifies every skill as current,
//! outdated, ahead, unversioned, or unknown to the registry. Per-skill
//! problems degrade to a per-skill status; they never abort the batch.

use std::cmp::Ordering;
use std::path::{Component, Path};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, SgError};
use crate::storage::Database;

pub mod frontmatter;

use frontmatter::{parse_frontmatter, parse_version};

/// Filename of the recognizable skill document inside each bundled skill
/// subdirectory.
pub const SKILL_DOCUMENT: &str = "SKILL.md";

/// Drift classification for one bundled skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Bundled version equals the registry's most recent known version.
    Current,
    /// Registry knows a newer version.
    Outdated,
    /// Bundled version is newer than anything the registry has recorded.
    Ahead,
    /// Declared version absent or not semantically parseable.
    MissingVersion,
    /// No registry record, or the record carries no usable version.
    NoRegistryData,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Current => write!(f, "current"),
            AuditStatus::Outdated => write!(f, "outdated"),
            AuditStatus::Ahead => write!(f, "ahead"),
            AuditStatus::MissingVersion => write!(f, "missing_version"),
            AuditStatus::NoRegistryData => write!(f, "no_registry_data"),
        }
    }
}

/// Per-skill audit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillAudit {
    pub name: String,
    pub bundled_version: Option<String>,
    pub registry_version: Option<String>,
    pub skill_id: Option<String>,
    pub status: AuditStatus,
}

/// Pack-level counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    /// Skills whose version diverges from the registry in either direction.
    pub drifted: usize,
    pub no_registry_data: usize,
}

/// Full result of auditing one pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackAudit {
    pub skills: Vec<SkillAudit>,
    pub summary: AuditSummary,
}

/// Reject paths carrying traversal sequences before touching the
/// filesystem.
fn validate_pack_path(pack_path: &Path) -> Result<()> {
    if pack_path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(SgError::InvalidPath(format!(
            "pack path {} contains traversal sequences",
            pack_path.display()
        )));
    }
    Ok(())
}

/// Audit every bundled skill under `<pack_path>/skills/`.
///
/// Registry identity for a bundled skill is `<namespace>/<declared-name>`.
/// Subdirectories without a recognizable skill document are skipped;
/// results are sorted by skill name for deterministic display.
pub fn audit_pack(db: &Database, pack_path: &Path, namespace: &str) -> Result<PackAudit> {
    validate_pack_path(pack_path)?;

    let skills_dir = pack_path.join("skills");
    if !skills_dir.is_dir() {
        return Err(SgError::PackNotFound(format!(
            "{} has no skills directory",
            pack_path.display()
        )));
    }

    let mut skills = Vec::new();
    for entry in WalkDir::new(&skills_dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("unreadable pack entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();

        let doc_path = dir.join(SKILL_DOCUMENT);
        let document = match std::fs::read_to_string(&doc_path) {
            Ok(document) => document,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "no skill document, skipping");
                continue;
            }
            Err(e) => {
                // One unreadable skill must not sink the batch.
                warn!(path = %doc_path.display(), "skipping unreadable skill document: {e}");
                continue;
            }
        };

        let dir_name = entry.file_name().to_string_lossy().into_owned();
        skills.push(audit_skill(db, &document, dir_name, namespace)?);
    }

    skills.sort_by(|a, b| a.name.cmp(&b.name));

    let drifted = skills
        .iter()
        .filter(|s| matches!(s.status, AuditStatus::Outdated | AuditStatus::Ahead))
        .count();
    let no_registry_data = skills
        .iter()
        .filter(|s| s.status == AuditStatus::NoRegistryData)
        .count();
    let summary = AuditSummary {
        total: skills.len(),
        drifted,
        no_registry_data,
    };

    Ok(PackAudit { skills, summary })
}

/// Classify one bundled skill document against the version ledger.
fn audit_skill(
    db: &Database,
    document: &str,
    dir_name: String,
    namespace: &str,
) -> Result<SkillAudit> {
    let fm = parse_frontmatter(document);
    let name = fm.name.unwrap_or(dir_name);

    let Some(bundled) = fm.version.as_deref().and_then(parse_version) else {
        return Ok(SkillAudit {
            name,
            bundled_version: None,
            registry_version: None,
            skill_id: None,
            status: AuditStatus::MissingVersion,
        });
    };

    let skill_id = format!("{namespace}/{name}");
    let record = db.most_recent_version(&skill_id)?;
    let registry = record
        .as_ref()
        .and_then(|r| r.version.as_deref())
        .and_then(parse_version);

    let (registry_version, status) = match registry {
        None => (None, AuditStatus::NoRegistryData),
        Some(registry) => {
            let status = match registry.cmp(&bundled) {
                Ordering::Equal => AuditStatus::Current,
                Ordering::Greater => AuditStatus::Outdated,
                Ordering::Less => AuditStatus::Ahead,
            };
            (Some(registry.to_string()), status)
        }
    };

    Ok(SkillAudit {
        name,
        bundled_version: Some(bundled.to_string()),
        registry_version,
        skill_id: Some(skill_id),
        status,
    })
}
