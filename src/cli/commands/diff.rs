//! sg diff - show what changed between installed and latest skill content

use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::diff::resolve::fetch_latest;
use crate::diff::{diff_skills, ChangeClassifier, DefaultClassifier};
use crate::error::{Result, SgError};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Skill identity (<owner>/<name>)
    pub identity: String,

    /// Compare from this file instead of the installed payload
    #[arg(long, value_name = "PATH")]
    pub old_file: Option<PathBuf>,

    /// Compare against this file instead of fetching the latest content
    #[arg(long, value_name = "PATH")]
    pub new_file: Option<PathBuf>,
}

/// Read the installed payload. An install path pointing at a directory is
/// resolved to the skill document inside it.
fn read_installed(install_path: &Path) -> Result<String> {
    let doc_path = if install_path.is_dir() {
        install_path.join(crate::audit::SKILL_DOCUMENT)
    } else {
        install_path.to_path_buf()
    };
    std::fs::read_to_string(&doc_path)
        .map_err(|e| SgError::Storage(format!("read installed payload {}: {e}", doc_path.display())))
}

pub fn run(ctx: &AppContext, args: &DiffArgs) -> Result<()> {
    let manifest = ctx.store.load()?;

    // Explicit file overrides never trigger resolution or a network fetch.
    let old = match &args.old_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| SgError::Storage(format!("read {}: {e}", path.display())))?,
        None => {
            let entry = manifest
                .entry(&args.identity)
                .ok_or_else(|| SgError::SkillNotFound(args.identity.clone()))?;
            read_installed(Path::new(&entry.install_path))?
        }
    };
    let new = match &args.new_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| SgError::Storage(format!("read {}: {e}", path.display())))?,
        None => {
            let entry = manifest
                .entry(&args.identity)
                .ok_or_else(|| SgError::SkillNotFound(args.identity.clone()))?;
            fetch_latest(&entry.source, ctx.config.fetch_timeout())?
        }
    };

    let diff = diff_skills(&old, &new);
    let magnitude = DefaultClassifier.classify(&old, &new);

    if ctx.machine {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "identity": args.identity,
                "magnitude": magnitude,
                "diff": diff,
            }))?
        );
        return Ok(());
    }

    if diff.is_empty() {
        println!("{} is unchanged", args.identity.bold());
        return Ok(());
    }

    println!(
        "{} ({} change)",
        args.identity.bold(),
        magnitude.to_string().yellow()
    );
    for heading in &diff.removed {
        println!("  {} {}", "-".red().bold(), heading.red());
    }
    for heading in &diff.added {
        println!("  {} {}", "+".green().bold(), heading.green());
    }
    for heading in &diff.modified {
        println!("  {} {}", "~".yellow().bold(), heading);
    }
    Ok(())
}
