//! Settings shared by the bulk image commands.
//!
//! [`Config`] replaces process-wide globals: the CLI fills one in and every
//! operation in [`crate::shuttle`] receives the values it needs from it.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DEFAULT_IMAGES_DIR: &str = "images-save";
pub const DEFAULT_OLD_REGISTRY: &str = "dockerhub.mlops.xx.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory `save` writes archives into.
    pub save_dir: PathBuf,
    /// Directory `load` reads archives from.
    pub load_dir: PathBuf,
    pub old_registry: String,
    pub new_registry: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            load_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            old_registry: DEFAULT_OLD_REGISTRY.to_string(),
            new_registry: String::new(),
        }
    }
}

impl Config {
    /// Checks the old registry before any tag is touched.
    /// An empty substring would match every tag.
    pub fn validate_old_registry(&self) -> Result<()> {
        if self.old_registry.is_empty() {
            return Err(anyhow!("Old registry must not be empty"));
        }
        Ok(())
    }
}
