//! sg pin - hold a skill at its current content identity

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct PinArgs {
    /// Skill identity (<owner>/<name>)
    pub identity: String,
}

pub fn run(ctx: &AppContext, args: &PinArgs) -> Result<()> {
    let mut pinned = None;
    ctx.store.update(|mut manifest| {
        pinned = Some(manifest.pin(&args.identity)?);
        Ok(manifest)
    })?;
    let pinned = pinned.unwrap_or_default();

    if ctx.machine {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "identity": args.identity,
                "pinnedVersion": pinned,
            }))?
        );
    } else {
        println!(
            "{} {} at {}",
            "Pinned".green().bold(),
            args.identity,
            pinned.cyan()
        );
    }
    Ok(())
}
