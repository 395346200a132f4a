//! Installed-skill manifest.
//!
//! The manifest is the durable record of every installed skill: identity,
//! source, install path, timestamps, content hashes, and pin state. It is a
//! single JSON document at a well-known path, mutated only through
//! [`store::ManifestStore::update`], which wraps every mutation in the lock
//! protocol from [`lock`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SgError};
use crate::hash::short_hash;

pub mod lock;
pub mod store;

pub use lock::{LockConfig, ManifestLock};
pub use store::ManifestStore;

/// Current manifest format version. Bumped only on breaking layout changes;
/// entries with unknown extra fields are carried through untouched.
pub const MANIFEST_VERSION: &str = "1.0";

/// One installed skill.
///
/// Field names follow the on-disk camelCase layout shared with other tools
/// that read the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// `<owner>/<name>`, stable across updates.
    pub identity: String,
    pub display_name: String,
    /// Declared version string; may be absent or non-semantic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Origin locator (registry identity or direct URL) used to re-fetch
    /// the latest content.
    pub source: String,
    pub install_path: String,
    pub installed_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Hash of the currently installed payload; recomputed on every
    /// install/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Hash captured at first install; never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content_hash: Option<String>,
    /// 8-character hash prefix holding this skill at a specific content
    /// identity, regardless of newer registry versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_version: Option<String>,
    /// Fields written by other (possibly newer) tool versions. Preserved
    /// verbatim across load/save cycles.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ManifestEntry {
    /// Create a fresh entry for a newly installed skill.
    #[must_use]
    pub fn new(identity: &str, display_name: &str, source: &str, install_path: &str) -> Self {
        let now = Utc::now();
        Self {
            identity: identity.to_string(),
            display_name: display_name.to_string(),
            version: None,
            source: source.to_string(),
            install_path: install_path.to_string(),
            installed_at: now,
            last_updated: now,
            content_hash: None,
            original_content_hash: None,
            pinned_version: None,
            extra: BTreeMap::new(),
        }
    }

    /// The hash a pin would be derived from: the current content hash when
    /// present, otherwise the hash captured at first install.
    #[must_use]
    pub fn pin_hash(&self) -> Option<&str> {
        self.content_hash
            .as_deref()
            .or(self.original_content_hash.as_deref())
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned_version.is_some()
    }
}

/// Top-level manifest container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(rename = "installedSkills", default)]
    pub installed_skills: BTreeMap<String, ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl Manifest {
    /// A fresh manifest with the current format version and no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            installed_skills: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn entry(&self, identity: &str) -> Option<&ManifestEntry> {
        self.installed_skills.get(identity)
    }

    /// Pin a skill at its current content identity.
    ///
    /// Stores the 8-character prefix of the entry's [`ManifestEntry::pin_hash`]
    /// as `pinnedVersion` and returns it. Fails with [`SgError::SkillNotFound`]
    /// for an unknown identity and [`SgError::InvalidSkill`] when the entry
    /// has no hash to pin to.
    pub fn pin(&mut self, identity: &str) -> Result<String> {
        let entry = self
            .installed_skills
            .get_mut(identity)
            .ok_or_else(|| SgError::SkillNotFound(identity.to_string()))?;

        let hash = entry.pin_hash().ok_or_else(|| {
            SgError::InvalidSkill(format!(
                "{identity} has no content hash recorded; cannot pin"
            ))
        })?;

        let pinned = short_hash(hash);
        entry.pinned_version = Some(pinned.clone());
        entry.last_updated = Utc::now();
        Ok(pinned)
    }

    /// Remove a skill's pin. Returns `true` if a pin was removed, `false`
    /// when the skill existed but was not pinned (a no-op, not an error).
    pub fn unpin(&mut self, identity: &str) -> Result<bool> {
        let entry = self
            .installed_skills
            .get_mut(identity)
            .ok_or_else(|| SgError::SkillNotFound(identity.to_string()))?;

        if entry.pinned_version.take().is_some() {
            entry.last_updated = Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_hashes(
        identity: &str,
        content: Option<&str>,
        original: Option<&str>,
    ) -> ManifestEntry {
        let mut e = ManifestEntry::new(identity, "Test Skill", "owner/test", "/tmp/test");
        e.content_hash = content.map(String::from);
        e.original_content_hash = original.map(String::from);
        e
    }

    #[test]
    fn pin_truncates_to_eight_chars() {
        let full = "a".repeat(64);
        let mut m = Manifest::empty();
        m.installed_skills.insert(
            "acme/fmt".into(),
            entry_with_hashes("acme/fmt", Some(&full), None),
        );

        let pinned = m.pin("acme/fmt").unwrap();
        assert_eq!(pinned, "aaaaaaaa");
        assert_eq!(
            m.entry("acme/fmt").unwrap().pinned_version.as_deref(),
            Some("aaaaaaaa")
        );
    }

    #[test]
    fn pin_falls_back_to_original_hash() {
        let mut m = Manifest::empty();
        m.installed_skills.insert(
            "acme/fmt".into(),
            entry_with_hashes("acme/fmt", None, Some("deadbeefcafe")),
        );

        assert_eq!(m.pin("acme/fmt").unwrap(), "deadbeef");
    }

    #[test]
    fn pin_without_any_hash_fails() {
        let mut m = Manifest::empty();
        m.installed_skills
            .insert("acme/fmt".into(), entry_with_hashes("acme/fmt", None, None));

        let err = m.pin("acme/fmt").unwrap_err();
        assert!(matches!(err, SgError::InvalidSkill(_)));
    }

    #[test]
    fn pin_unknown_skill_fails() {
        let mut m = Manifest::empty();
        assert!(matches!(
            m.pin("nobody/nothing").unwrap_err(),
            SgError::SkillNotFound(_)
        ));
    }

    #[test]
    fn unpin_is_noop_when_not_pinned() {
        let mut m = Manifest::empty();
        m.installed_skills
            .insert("acme/fmt".into(), entry_with_hashes("acme/fmt", Some("ff"), None));

        assert!(!m.unpin("acme/fmt").unwrap());
        m.pin("acme/fmt").unwrap();
        assert!(m.unpin("acme/fmt").unwrap());
        assert!(!m.entry("acme/fmt").unwrap().is_pinned());
    }

    #[test]
    fn unknown_entry_fields_round_trip() {
        let raw = r#"{
            "version": "1.0",
            "installedSkills": {
                "acme/fmt": {
                    "identity": "acme/fmt",
                    "displayName": "Formatter",
                    "source": "acme/fmt",
                    "installPath": "/skills/fmt",
                    "installedAt": "2026-01-01T00:00:00Z",
                    "lastUpdated": "2026-01-01T00:00:00Z",
                    "futureField": {"nested": true}
                }
            }
        }"#;

        let m: Manifest = serde_json::from_str(raw).unwrap();
        let entry = m.entry("acme/fmt").unwrap();
        assert!(entry.extra.contains_key("futureField"));

        let out = serde_json::to_string(&m).unwrap();
        assert!(out.contains("futureField"));
    }
}
