//! sg list - list installed skills and their pin state

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;
use crate::hash::short_hash;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show pinned skills
    #[arg(long)]
    pub pinned: bool,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let manifest = ctx.store.load()?;

    let entries: Vec<_> = manifest
        .installed_skills
        .values()
        .filter(|e| !args.pinned || e.is_pinned())
        .collect();

    if ctx.machine {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No skills installed.");
        return Ok(());
    }

    for entry in entries {
        let hash = entry
            .content_hash
            .as_deref()
            .map(short_hash)
            .unwrap_or_else(|| "-".to_string());
        let pin = match &entry.pinned_version {
            Some(pin) => format!("pinned@{pin}").cyan().to_string(),
            None => String::new(),
        };
        println!(
            "{:<30} {:<10} {:<10} {}",
            entry.identity.bold(),
            entry.version.as_deref().unwrap_or("-"),
            hash,
            pin
        );
    }
    Ok(())
}
