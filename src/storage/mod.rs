//! Local relational store: registry version ledger and advisory tables.

pub mod migrations;
pub mod sqlite;

pub use sqlite::{AdvisoryRecord, Database, VersionRecord};
