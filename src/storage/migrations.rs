//! Database migrations

use rusqlite::Connection;

use crate::error::{Result, SgError};

const MIGRATIONS: [&str; 1] = [include_str!("../../migrations/001_initial_schema.sql")];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Run all migrations on the database
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| SgError::Storage(err.to_string()))?;

    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let target_version = (idx + 1) as u32;
        if current_version >= target_version {
            continue;
        }

        conn.execute_batch(sql)
            .map_err(|err| SgError::Storage(format!("migration {target_version} failed: {err}")))?;
        conn.pragma_update(None, "user_version", target_version)
            .map_err(|err| {
                SgError::Storage(format!("failed to set user_version {target_version}: {err}"))
            })?;
    }

    Ok(SCHEMA_VERSION)
}
