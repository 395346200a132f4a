//! sg init - create the data root, an empty manifest, and the database

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;
use crate::manifest::Manifest;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run(ctx: &AppContext, _args: &InitArgs) -> Result<()> {
    // Building the context already created the data root and ran database
    // migrations; all that may be missing is the manifest file itself.
    let created = if ctx.store.manifest_path().exists() {
        false
    } else {
        ctx.store.save(&Manifest::empty())?;
        true
    };

    if ctx.machine {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "dataRoot": ctx.data_root,
                "manifestCreated": created,
            }))?
        );
    } else if created {
        println!(
            "{} skill guard data in {}",
            "Initialized".green().bold(),
            ctx.data_root.display()
        );
    } else {
        println!("Already initialized at {}", ctx.data_root.display());
    }
    Ok(())
}
