use anyhow::Result;

use crate::config::variables::parse_pair;
use crate::config::RailupConfig;
use crate::deploy::context::{DeployContext, DeployOptions};
use crate::deploy::steps;
use crate::output::{self, Tone};
use crate::secrets;

use super::deploy::{prepare, target_options};
use super::{mask_value, TargetArgs};

pub async fn push(config: RailupConfig, fail_fast: bool, target: TargetArgs) -> Result<()> {
    let options = DeployOptions {
        fail_fast,
        ..target_options(target)
    };
    let (ctx, cli) = prepare(config, options)?;

    let results = steps::set_variables(&cli, &ctx).await;
    let failed = results.iter().filter(|s| !s.succeeded()).count();

    println!();
    if failed == 0 {
        output::success(&format!("{} variable(s) applied", results.len()));
    } else {
        output::result(
            Tone::Failure,
            &format!("{} of {} variable(s) failed", failed, results.len()),
        );
    }
    Ok(())
}

pub async fn set(config: RailupConfig, pair: &str, target: TargetArgs) -> Result<()> {
    let (key, value) = parse_pair(pair)?;
    let (ctx, cli) = prepare(config, target_options(target))?;

    steps::set_variable(&cli, &ctx, &key, &value).await;
    Ok(())
}

pub fn list(config: RailupConfig, reveal: bool) -> Result<()> {
    let secrets = secrets::load(&config)?;
    let name = config.project.name.clone();
    let (ctx, _) = DeployContext::new(config, DeployOptions::default(), secrets);

    if ctx.variables.is_empty() {
        output::info(&format!("No variables configured for '{}'", name));
        return Ok(());
    }

    output::header(&format!("Variables for '{}'", name));
    for (key, value) in ctx.variables.iter() {
        if ctx.is_secret(value) && !reveal {
            println!("  {}={}  (secret)", key, mask_value(value));
        } else if ctx.is_secret(value) {
            println!("  {}={}  (secret)", key, value);
        } else {
            println!("  {}={}", key, value);
        }
    }
    Ok(())
}
