//! CLI module - command-line interface definitions and handlers.
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

/// Skill Guard - integrity and version-drift tracking for installed AI skills
#[derive(Parser, Debug)]
#[command(name = "sg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable machine-readable JSON output
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/sg/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data root, an empty manifest, and the local database
    Init(commands::init::InitArgs),
    /// List installed skills and their pin state
    List(commands::list::ListArgs),
    /// Hold a skill at its current content identity
    Pin(commands::pin::PinArgs),
    /// Remove a skill's pin
    Unpin(commands::unpin::UnpinArgs),
    /// Show what changed between the installed and latest skill content
    Diff(commands::diff::DiffArgs),
    /// Check a pack's bundled skills for version drift
    Audit(commands::audit::AuditArgs),
    /// Show security advisories
    Advisories(commands::advisories::AdvisoriesArgs),
}
