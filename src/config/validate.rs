use anyhow::{bail, Result};

use super::variables::validate_key;
use super::RailupConfig;

pub fn validate(config: &RailupConfig) -> Result<()> {
    if config.project.name.trim().is_empty() {
        bail!("project.name cannot be empty");
    }

    if config.railway.cli.trim().is_empty() {
        bail!("railway.cli cannot be empty");
    }

    if validate_key(&config.railway.token_env).is_err() {
        bail!(
            "railway.token_env '{}' is not a valid environment variable name",
            config.railway.token_env
        );
    }

    for (name, value) in [
        ("status", config.timeouts.status),
        ("variables", config.timeouts.variables),
        ("deploy", config.timeouts.deploy),
    ] {
        if value == 0 {
            bail!("timeouts.{} must be greater than zero", name);
        }
    }

    if let Some(env) = &config.railway.environment {
        if env.trim().is_empty() {
            bail!("railway.environment cannot be empty when set");
        }
    }

    if let Some(service) = &config.railway.service {
        if service.trim().is_empty() {
            bail!("railway.service cannot be empty when set");
        }
    }

    for key in config.variables.keys() {
        if let Err(e) = validate_key(key) {
            bail!("[variables] {}", e);
        }
    }

    Ok(())
}
