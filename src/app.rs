//! Application context.
//!
//! Everything a command needs, built once per invocation: resolved config,
//! the manifest store handle, and the local database. Commands never reach
//! for ambient globals; the context is passed by reference throughout.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::ManifestStore;
use crate::storage::Database;
use crate::utils::fs::ensure_dir;

/// Shared state for one CLI invocation.
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub data_root: PathBuf,
    pub store: ManifestStore,
    pub db: Database,
    /// Machine-readable (JSON) output requested.
    pub machine: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let data_root = config.data_root()?;
        ensure_dir(&data_root)?;

        let store = ManifestStore::new(&data_root, config.lock_config());
        let db = Database::open(&data_root.join("registry.db"))?;

        Ok(Self {
            config,
            data_root,
            store,
            db,
            machine: cli.machine,
        })
    }
}
