//! Security advisory matching.
//!
//! Cross-references installed skill identities against the locally cached
//! advisory table. Read-only: the table is populated by an external sync
//! process. The core promises filtering by identity and active state only;
//! presentation ordering belongs to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::storage::{AdvisoryRecord, Database};

/// Advisory severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a stored severity string. Unknown values map to `Low` rather
    /// than failing: an advisory with a severity this build doesn't know
    /// should still be shown, not dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A published security advisory tied to one skill identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub id: String,
    pub skill_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub patched_versions: Option<Vec<String>>,
    pub active: bool,
}

impl Advisory {
    fn from_record(record: AdvisoryRecord) -> Self {
        Self {
            severity: Severity::parse(&record.severity),
            id: record.id,
            skill_id: record.skill_id,
            title: record.title,
            description: record.description,
            published_at: record.published_at,
            patched_versions: record.patched_versions,
            active: record.active,
        }
    }

    /// Whether the publisher declared patched versions, i.e. whether a
    /// remediation command can be suggested.
    #[must_use]
    pub fn has_patch(&self) -> bool {
        self.patched_versions
            .as_ref()
            .is_some_and(|v| !v.is_empty())
    }
}

/// All advisories currently marked active.
pub fn active_advisories(db: &Database) -> Result<Vec<Advisory>> {
    Ok(db
        .active_advisories()?
        .into_iter()
        .map(Advisory::from_record)
        .collect())
}

/// All advisories for one skill identity, active or not.
pub fn advisories_for(db: &Database, skill_id: &str) -> Result<Vec<Advisory>> {
    Ok(db
        .advisories_for(skill_id)?
        .into_iter()
        .map(Advisory::from_record)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, skill_id: &str, severity: &str, active: bool) -> AdvisoryRecord {
        AdvisoryRecord {
            id: id.to_string(),
            skill_id: skill_id.to_string(),
            severity: severity.to_string(),
            title: "Test advisory".to_string(),
            description: "details".to_string(),
            published_at: Utc::now(),
            patched_versions: None,
            active,
        }
    }

    #[test]
    fn severity_parse_round_trip() {
        for s in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(Severity::parse(&s.to_string()), s);
        }
    }

    #[test]
    fn unknown_severity_degrades_to_low() {
        assert_eq!(Severity::parse("catastrophic"), Severity::Low);
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn active_filter_and_identity_filter() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_advisory(&record("ADV-1", "acme/fmt", "high", true)).unwrap();
        db.upsert_advisory(&record("ADV-2", "acme/fmt", "low", false)).unwrap();
        db.upsert_advisory(&record("ADV-3", "acme/lint", "critical", true)).unwrap();

        let active = active_advisories(&db).unwrap();
        assert_eq!(active.len(), 2);

        let fmt = advisories_for(&db, "acme/fmt").unwrap();
        assert_eq!(fmt.len(), 2);
        assert!(fmt.iter().any(|a| !a.active));
    }

    #[test]
    fn has_patch_requires_nonempty_set() {
        let mut rec = record("ADV-1", "acme/fmt", "high", true);
        assert!(!Advisory::from_record(rec.clone()).has_patch());

        rec.patched_versions = Some(vec![]);
        assert!(!Advisory::from_record(rec.clone()).has_patch());

        rec.patched_versions = Some(vec!["1.2.1".to_string()]);
        assert!(Advisory::from_record(rec).has_patch());
    }
}
