//! Crash-safe manifest persistence.
//!
//! Reads never fail into the caller's lap: a missing or unparseable file
//! loads as an empty manifest. Writes go through a temp file in the same
//! directory followed by an atomic rename, so a reader can never observe a
//! partially written manifest and a crash mid-write leaves the previous
//! file intact. Mutations go through [`ManifestStore::update`], the only
//! lock-guarded read-modify-write entry point.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SgError};
use crate::manifest::lock::{LockConfig, ManifestLock};
use crate::manifest::Manifest;

/// Handle to the manifest file and its lock marker.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    manifest_path: PathBuf,
    lock_path: PathBuf,
    lock_config: LockConfig,
}

impl ManifestStore {
    /// A store rooted at `data_root`, using `manifest.json` and its
    /// co-located `.lock` marker.
    #[must_use]
    pub fn new(data_root: &Path, lock_config: LockConfig) -> Self {
        let manifest_path = data_root.join("manifest.json");
        let lock_path = data_root.join("manifest.json.lock");
        Self {
            manifest_path,
            lock_path,
            lock_config,
        }
    }

    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Load the manifest, falling back to an empty one on a missing or
    /// corrupt file. Safe to call speculatively; never errors on content.
    pub fn load(&self) -> Result<Manifest> {
        let raw = match fs::read_to_string(&self.manifest_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.manifest_path.display(), "no manifest file, starting empty");
                return Ok(Manifest::empty());
            }
            Err(e) => {
                return Err(SgError::Storage(format!(
                    "read {}: {e}",
                    self.manifest_path.display()
                )));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(manifest) => Ok(manifest),
            Err(e) => {
                warn!(
                    path = %self.manifest_path.display(),
                    "manifest unparseable ({e}), starting empty"
                );
                Ok(Manifest::empty())
            }
        }
    }

    /// Serialize and atomically replace the manifest file.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        let tmp_path = self.manifest_path.with_extension("json.tmp");

        fs::write(&tmp_path, json).map_err(|e| {
            SgError::Storage(format!("write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.manifest_path).map_err(|e| {
            SgError::Storage(format!(
                "rename {} over {}: {e}",
                tmp_path.display(),
                self.manifest_path.display()
            ))
        })?;

        debug!(path = %self.manifest_path.display(), "manifest saved");
        Ok(())
    }

    /// Lock-guarded read-modify-write: acquire, load, apply `transform`,
    /// save, release. The lock is released on every exit path and the
    /// original error re-raised afterward; the transform's own error passes
    /// through unchanged.
    pub fn update<F>(&self, transform: F) -> Result<Manifest>
    where
        F: FnOnce(Manifest) -> Result<Manifest>,
    {
        let mut lock = ManifestLock::acquire(&self.lock_path, &self.lock_config)?;

        let result = self
            .load()
            .and_then(transform)
            .and_then(|manifest| self.save(&manifest).map(|()| manifest));

        let release_result = lock.release();
        // The operation's own error wins; a release failure only surfaces
        // when the operation itself succeeded.
        match (result, release_result) {
            (Ok(manifest), Ok(())) => Ok(manifest),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ManifestStore {
        ManifestStore::new(temp.path(), LockConfig::default())
    }

    #[test]
    fn load_missing_file_yields_empty_manifest_twice() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);

        let first = s.load().unwrap();
        let second = s.load().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Manifest::empty());
    }

    #[test]
    fn load_corrupt_file_yields_empty_manifest() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);
        fs::write(s.manifest_path(), "{not json").unwrap();

        assert_eq!(s.load().unwrap(), Manifest::empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);

        let mut manifest = Manifest::empty();
        manifest.installed_skills.insert(
            "acme/fmt".into(),
            ManifestEntry::new("acme/fmt", "Formatter", "acme/fmt", "/skills/fmt"),
        );
        s.save(&manifest).unwrap();

        assert_eq!(s.load().unwrap(), manifest);
    }

    #[test]
    fn interrupted_write_leaves_previous_manifest_intact() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);

        let mut manifest = Manifest::empty();
        manifest.installed_skills.insert(
            "acme/fmt".into(),
            ManifestEntry::new("acme/fmt", "Formatter", "acme/fmt", "/skills/fmt"),
        );
        s.save(&manifest).unwrap();

        // Simulate a crash mid-write: a half-written temp file exists but
        // the rename never happened.
        let tmp = s.manifest_path().with_extension("json.tmp");
        fs::write(&tmp, "{\"version\": \"1.0\", \"installedSki").unwrap();

        assert_eq!(s.load().unwrap(), manifest);
    }

    #[test]
    fn update_applies_transform_and_persists() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);

        let updated = s
            .update(|mut m| {
                m.installed_skills.insert(
                    "acme/fmt".into(),
                    ManifestEntry::new("acme/fmt", "Formatter", "acme/fmt", "/skills/fmt"),
                );
                Ok(m)
            })
            .unwrap();

        assert_eq!(updated.installed_skills.len(), 1);
        assert_eq!(s.load().unwrap(), updated);
    }

    #[test]
    fn update_releases_lock_when_transform_fails() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);

        let err = s
            .update(|_| Err(SgError::SkillNotFound("ghost/skill".into())))
            .unwrap_err();
        assert!(matches!(err, SgError::SkillNotFound(_)));

        // Lock must be gone; a second update acquires immediately.
        assert!(!temp.path().join("manifest.json.lock").exists());
        s.update(Ok).unwrap();
    }

    #[test]
    fn update_does_not_persist_failed_transform() {
        let temp = TempDir::new().unwrap();
        let s = store(&temp);
        s.update(|mut m| {
            m.installed_skills.insert(
                "acme/fmt".into(),
                ManifestEntry::new("acme/fmt", "Formatter", "acme/fmt", "/skills/fmt"),
            );
            Ok(m)
        })
        .unwrap();

        let _ = s.update(|mut m| {
            m.installed_skills.clear();
            Err(SgError::InvalidSkill("boom".into()))
        });

        assert_eq!(s.load().unwrap().installed_skills.len(), 1);
    }
}
