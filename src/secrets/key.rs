use std::fs;
use std::path::PathBuf;

use age::secrecy::ExposeSecret;
use age::x25519;
use anyhow::{Context, Result};

use crate::config::SecretsConfig;

pub const AGE_KEY_ENV: &str = "RAILUP_AGE_KEY";

pub fn generate_keypair() -> (x25519::Identity, x25519::Recipient) {
    let identity = x25519::Identity::generate();
    let recipient = identity.to_public();
    (identity, recipient)
}

/// ~/.config/railup/keys/
fn keys_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("railup").join("keys"))
}

fn key_path(project: &str) -> Result<PathBuf> {
    Ok(keys_dir()?.join(format!("{}.key", project)))
}

/// Save the private key with mode 600.
pub fn save_identity(project: &str, identity: &x25519::Identity) -> Result<PathBuf> {
    let dir = keys_dir()?;
    fs::create_dir_all(&dir).context("Failed to create keys directory")?;

    let path = key_path(project)?;
    let content = identity.to_string();
    fs::write(&path, content.expose_secret().as_bytes()).context("Failed to write identity file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set key file permissions")?;
    }

    Ok(path)
}

/// Load identity from RAILUP_AGE_KEY, else from the per-project key file.
pub fn load_identity(project: &str) -> Result<x25519::Identity> {
    if let Ok(key_str) = std::env::var(AGE_KEY_ENV) {
        return parse_identity(&key_str)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", AGE_KEY_ENV, e));
    }

    let path = key_path(project)?;
    let content = fs::read_to_string(&path).with_context(|| {
        format!(
            "Key not found at {}. Run `railup secrets init` or set {}.",
            path.display(),
            AGE_KEY_ENV
        )
    })?;

    parse_identity(&content).map_err(|e| anyhow::anyhow!("Invalid key file {}: {}", path.display(), e))
}

fn parse_identity(s: &str) -> std::result::Result<x25519::Identity, String> {
    s.trim().parse::<x25519::Identity>().map_err(|e| e.to_string())
}

pub fn load_recipients(config: &SecretsConfig) -> Result<Vec<x25519::Recipient>> {
    config
        .recipients
        .iter()
        .map(|r| {
            r.parse::<x25519::Recipient>()
                .map_err(|e| anyhow::anyhow!("Invalid recipient '{}': {}", r, e))
        })
        .collect()
}
