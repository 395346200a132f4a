pub mod advisories;
pub mod app;
pub mod audit;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod storage;
pub mod utils;

pub use error::{Result, SgError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
