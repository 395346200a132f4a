//! sg unpin - remove a skill's pin

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct UnpinArgs {
    /// Skill identity (<owner>/<name>)
    pub identity: String,
}

pub fn run(ctx: &AppContext, args: &UnpinArgs) -> Result<()> {
    let mut removed = false;
    ctx.store.update(|mut manifest| {
        removed = manifest.unpin(&args.identity)?;
        Ok(manifest)
    })?;

    if ctx.machine {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "identity": args.identity,
                "removed": removed,
            }))?
        );
    } else if removed {
        println!("{} {}", "Unpinned".green().bold(), args.identity);
    } else {
        println!("{} was not pinned", args.identity.yellow());
    }
    Ok(())
}
