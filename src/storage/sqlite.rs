//! SQLite database layer.
//!
//! Thin typed wrapper over the registry version ledger and advisory tables.
//! This core issues read queries; the write paths exist for the external
//! registry-sync process and the test suite. Timestamps are stored as
//! RFC 3339 UTC strings, which order lexically.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::{Result, SgError};
use crate::storage::migrations;

/// SQLite database wrapper for the version ledger and advisories.
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

/// One observed registry version of a skill. Append-only fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub skill_id: String,
    pub content_hash: String,
    /// Declared semantic version. A row with no usable version still
    /// exists; drift comparison treats it like "no record".
    pub version: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// One published security advisory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRecord {
    pub id: String,
    pub skill_id: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// Versions in which the issue is fixed, when the publisher declared
    /// any. Drives whether a remediation command can be suggested.
    pub patched_versions: Option<Vec<String>>,
    pub active: bool,
}

fn parse_timestamp(raw: &str, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("{column}: {e}").into(),
            )
        })
}

fn advisory_from_row(row: &Row<'_>) -> rusqlite::Result<AdvisoryRecord> {
    let published_at: String = row.get(5)?;
    let patched_json: Option<String> = row.get(6)?;
    let patched_versions = match patched_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        None => None,
    };

    Ok(AdvisoryRecord {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        severity: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        published_at: parse_timestamp(&published_at, "published_at")?,
        patched_versions,
        active: row.get(7)?,
    })
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// In-memory database, for tests and ephemeral use.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    // =========================================================================
    // Version ledger
    // =========================================================================

    /// The most recently recorded version for a skill, by `recorded_at`,
    /// regardless of insertion order. `None` is a valid outcome: the
    /// registry has never reported this skill.
    pub fn most_recent_version(&self, skill_id: &str) -> Result<Option<VersionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT skill_id, content_hash, version, recorded_at
             FROM skill_versions
             WHERE skill_id = ?
             ORDER BY recorded_at DESC
             LIMIT 1",
        )?;
        let mut rows = stmt.query([skill_id])?;
        if let Some(row) = rows.next()? {
            let recorded_at: String = row.get(3)?;
            return Ok(Some(VersionRecord {
                skill_id: row.get(0)?,
                content_hash: row.get(1)?,
                version: row.get(2)?,
                recorded_at: parse_timestamp(&recorded_at, "recorded_at")
                    .map_err(SgError::Database)?,
            }));
        }
        Ok(None)
    }

    /// Append a version observation. Owned by the registry-sync process;
    /// exposed here so sync and tests share one write path.
    pub fn record_version(&self, record: &VersionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO skill_versions (skill_id, content_hash, version, recorded_at)
             VALUES (?, ?, ?, ?)",
            params![
                record.skill_id,
                record.content_hash,
                record.version,
                record.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // Advisories
    // =========================================================================

    /// All advisories currently marked active, in storage order.
    pub fn active_advisories(&self) -> Result<Vec<AdvisoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, skill_id, severity, title, description, published_at,
                    patched_versions, active
             FROM advisories
             WHERE active = 1",
        )?;
        let rows = stmt.query_map([], advisory_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// All advisories (active or not) for one skill identity.
    pub fn advisories_for(&self, skill_id: &str) -> Result<Vec<AdvisoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, skill_id, severity, title, description, published_at,
                    patched_versions, active
             FROM advisories
             WHERE skill_id = ?",
        )?;
        let rows = stmt.query_map([skill_id], advisory_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Insert or update an advisory. Owned by the sync process.
    pub fn upsert_advisory(&self, record: &AdvisoryRecord) -> Result<()> {
        let patched_json = record
            .patched_versions
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO advisories
                (id, skill_id, severity, title, description, published_at,
                 patched_versions, active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                skill_id=excluded.skill_id,
                severity=excluded.severity,
                title=excluded.title,
                description=excluded.description,
                published_at=excluded.published_at,
                patched_versions=excluded.patched_versions,
                active=excluded.active",
            params![
                record.id,
                record.skill_id,
                record.severity,
                record.title,
                record.description,
                record.published_at.to_rfc3339(),
                patched_json,
                record.active,
            ],
        )?;
        Ok(())
    }
}
