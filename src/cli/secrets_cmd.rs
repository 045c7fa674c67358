use anyhow::{bail, Result};

use crate::config::variables::{parse_pair, validate_key};
use crate::config::RailupConfig;
use crate::output;
use crate::secrets::{key, store};

use super::mask_value;

pub fn init(config: &RailupConfig) -> Result<()> {
    let project = &config.project.name;
    let (identity, recipient) = key::generate_keypair();

    let key_path = key::save_identity(project, &identity)?;

    output::success(&format!("Key pair generated for '{}'", project));
    println!();
    output::info(&format!("Private key saved to: {}", key_path.display()));
    output::info("Add this line to [secrets] in railup.toml:");
    println!();
    println!("  [secrets]");
    println!("  recipients = [\"{}\"]", recipient);
    println!();
    output::info(&format!(
        "For CI, set {} to the private key content.",
        key::AGE_KEY_ENV
    ));
    output::warning("Keep the private key safe! Do not commit it to the repository.");

    Ok(())
}

fn recipients(config: &RailupConfig) -> Result<Vec<age::x25519::Recipient>> {
    let recipients = key::load_recipients(&config.secrets)?;
    if recipients.is_empty() {
        bail!("No recipients configured. Add recipients to [secrets] in railup.toml.");
    }
    Ok(recipients)
}

pub fn set(config: &RailupConfig, pair: &str) -> Result<()> {
    let (key_name, value) = parse_pair(pair)?;

    let identity = key::load_identity(&config.project.name)?;
    let recipients = recipients(config)?;

    let mut secrets = store::read_secrets(&config.root, &identity)?;
    secrets.insert(key_name.clone(), value);
    store::write_secrets(&config.root, &secrets, &recipients)?;

    if key_name == config.railway.token_env {
        output::success(&format!("Stored the Railway token as {}", key_name));
    } else {
        output::success(&format!("Set secret {}", key_name));
    }
    Ok(())
}

pub fn unset(config: &RailupConfig, key_name: &str) -> Result<()> {
    validate_key(key_name)?;

    let identity = key::load_identity(&config.project.name)?;
    let recipients = recipients(config)?;

    let mut secrets = store::read_secrets(&config.root, &identity)?;

    if secrets.remove(key_name).is_none() {
        output::warning(&format!("Secret '{}' not found", key_name));
        return Ok(());
    }

    store::write_secrets(&config.root, &secrets, &recipients)?;

    output::success(&format!("Removed secret {}", key_name));
    Ok(())
}

pub fn list(config: &RailupConfig, reveal: bool) -> Result<()> {
    let identity = key::load_identity(&config.project.name)?;
    let secrets = store::read_secrets(&config.root, &identity)?;

    if secrets.is_empty() {
        output::info(&format!("No secrets for '{}'", config.project.name));
        return Ok(());
    }

    output::header(&format!("Secrets for '{}'", config.project.name));
    for (key, value) in &secrets {
        if reveal {
            println!("  {}={}", key, value);
        } else {
            println!("  {}={}", key, mask_value(value));
        }
    }
    Ok(())
}
