//! sg audit - check a pack's bundled skills for version drift

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::audit::{audit_pack, AuditStatus};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Path to the pack directory (containing a skills/ subdirectory)
    pub pack_path: PathBuf,
}

pub fn run(ctx: &AppContext, args: &AuditArgs) -> Result<()> {
    let audit = audit_pack(&ctx.db, &args.pack_path, &ctx.config.audit.namespace)?;

    if ctx.machine {
        println!("{}", serde_json::to_string_pretty(&audit)?);
        return Ok(());
    }

    for skill in &audit.skills {
        let status = match skill.status {
            AuditStatus::Current => "current".green().to_string(),
            AuditStatus::Outdated => "outdated".red().bold().to_string(),
            AuditStatus::Ahead => "ahead".yellow().to_string(),
            AuditStatus::MissingVersion => "missing version".dimmed().to_string(),
            AuditStatus::NoRegistryData => "no registry data".dimmed().to_string(),
        };
        println!(
            "{:<25} {:<10} {:<10} {}",
            skill.name.bold(),
            skill.bundled_version.as_deref().unwrap_or("-"),
            skill.registry_version.as_deref().unwrap_or("-"),
            status
        );
    }

    println!();
    println!(
        "{} skills, {} drifted, {} without registry data",
        audit.summary.total,
        audit.summary.drifted.to_string().yellow(),
        audit.summary.no_registry_data
    );
    Ok(())
}
