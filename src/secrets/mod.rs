pub mod key;
pub mod store;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::RailupConfig;

/// Decrypted secrets for the project, or nothing when no store exists.
pub fn load(config: &RailupConfig) -> Result<BTreeMap<String, String>> {
    let path = store::secrets_path(&config.root);
    if !path.exists() {
        debug!("no secret store at {}", path.display());
        return Ok(BTreeMap::new());
    }

    let identity = key::load_identity(&config.project.name)?;
    store::read_secrets(&config.root, &identity)
        .with_context(|| format!("Failed to open secret store {}", path.display()))
}
