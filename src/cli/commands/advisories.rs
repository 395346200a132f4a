//! sg advisories - show security advisories

use clap::Args;
use colored::Colorize;

use crate::advisories::{active_advisories, advisories_for, Advisory, Severity};
use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct AdvisoriesArgs {
    /// Show advisories for one skill identity instead of all active ones
    pub identity: Option<String>,
}

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Critical => "CRITICAL".red().bold().to_string(),
        Severity::High => "HIGH".red().to_string(),
        Severity::Medium => "MEDIUM".yellow().to_string(),
        Severity::Low => "LOW".dimmed().to_string(),
    }
}

fn render(advisory: &Advisory) {
    println!(
        "{} [{}] {} - {}",
        advisory.id.bold(),
        severity_label(advisory.severity),
        advisory.skill_id,
        advisory.title
    );
    if advisory.has_patch() {
        let versions = advisory
            .patched_versions
            .as_deref()
            .unwrap_or_default()
            .join(", ");
        println!("    patched in: {}", versions.green());
    }
}

pub fn run(ctx: &AppContext, args: &AdvisoriesArgs) -> Result<()> {
    let advisories = match &args.identity {
        Some(identity) => advisories_for(&ctx.db, identity)?,
        None => active_advisories(&ctx.db)?,
    };

    if ctx.machine {
        println!("{}", serde_json::to_string_pretty(&advisories)?);
        return Ok(());
    }

    if advisories.is_empty() {
        match &args.identity {
            Some(identity) => println!("No advisories for {identity}."),
            None => println!("No active advisories."),
        }
        return Ok(());
    }

    for advisory in &advisories {
        render(advisory);
    }
    Ok(())
}
