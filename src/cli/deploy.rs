use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::config::RailupConfig;
use crate::deploy;
use crate::deploy::context::{DeployContext, DeployOptions};
use crate::output;
use crate::runner::RailwayCli;
use crate::secrets;

use super::{DeployArgs, TargetArgs};

pub async fn run(config: RailupConfig, args: DeployArgs) -> Result<()> {
    let options = DeployOptions {
        fail_fast: args.fail_fast,
        strict: args.strict,
        skip_variables: args.skip_variables,
        ..target_options(args.target)
    };

    let (ctx, cli) = prepare(config, options)?;
    let report = deploy::run(&cli, &ctx).await;

    for step in report.failures() {
        warn!(step = %step.label, command = %step.command, "step did not succeed");
    }
    info!(
        deployed = report.deployed(),
        failed_steps = report.failures().len(),
        "deploy run finished"
    );

    if ctx.options.strict {
        report.into_result()?;
    }
    Ok(())
}

pub fn target_options(target: TargetArgs) -> DeployOptions {
    DeployOptions {
        environment: target.environment,
        service: target.service,
        ..Default::default()
    }
}

/// Check the CLI and working directory, load secrets and resolve the token.
pub fn prepare(config: RailupConfig, options: DeployOptions) -> Result<(DeployContext, RailwayCli)> {
    preflight(&config)?;

    let secrets = secrets::load(&config)?;
    let working_dir = config.working_dir();
    let token_env = config.railway.token_env.clone();

    let (ctx, token) = DeployContext::new(config, options, secrets);
    if token.is_none() {
        output::warning(&format!(
            "{} is not set; relying on the Railway CLI's own login",
            token_env
        ));
    }

    Ok((ctx, RailwayCli::new(working_dir, &token_env, token)))
}

fn preflight(config: &RailupConfig) -> Result<()> {
    let cli = &config.railway.cli;
    which::which(cli).with_context(|| {
        format!(
            "'{}' was not found. Install the Railway CLI: https://docs.railway.app/guides/cli",
            cli
        )
    })?;

    let dir = config.working_dir();
    if !dir.is_dir() {
        bail!("Working directory {} does not exist", dir.display());
    }

    Ok(())
}
