//! CLI command implementations.
//!
//! Each subcommand has its own module with an `Args` struct and a `run()`
//! function taking the shared [`AppContext`].

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod advisories;
pub mod audit;
pub mod diff;
pub mod init;
pub mod list;
pub mod pin;
pub mod unpin;

/// Dispatch a parsed subcommand.
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Pin(args) => pin::run(ctx, args),
        Commands::Unpin(args) => unpin::run(ctx, args),
        Commands::Diff(args) => diff::run(ctx, args),
        Commands::Audit(args) => audit::run(ctx, args),
        Commands::Advisories(args) => advisories::run(ctx, args),
    }
}
