use anyhow::{Context, Result};
use crossterm::terminal;

use crate::config::Config;
use crate::store::FileStore;

pub mod exec;
pub mod ping;
pub mod prompts;
pub mod run;
pub mod store;

/// Enables raw mode on creation, restores the terminal on drop.
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
    }
}

/// The persistent store for `session`, under the configured directory.
pub fn open_store(config: &Config, session: &str) -> Result<FileStore> {
    let dir = match &config.session.store_dir {
        Some(dir) => dir.clone(),
        None => FileStore::default_dir()?,
    };
    FileStore::new(&dir, session)
}
