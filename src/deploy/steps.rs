use tracing::{info, warn};

use crate::output;
use crate::runner::{self, CommandRunner};

use super::context::DeployContext;
use super::report::StepOutcome;

pub const TOTAL_STEPS: usize = 3;

pub async fn check_status<R>(runner: &R, ctx: &DeployContext) -> StepOutcome
where
    R: CommandRunner + ?Sized,
{
    output::step(1, TOTAL_STEPS, "Checking Railway status");

    let spec = ctx.status_command();
    let outcome = runner::run_command(runner, &spec, ctx.config.timeouts.status()).await;
    StepOutcome::new("status", &spec, outcome)
}

pub async fn set_variable<R>(runner: &R, ctx: &DeployContext, key: &str, value: &str) -> StepOutcome
where
    R: CommandRunner + ?Sized,
{
    let spec = ctx.set_variable_command(key, value);
    let outcome = runner::run_command(runner, &spec, ctx.config.timeouts.variables()).await;
    StepOutcome::new(key, &spec, outcome)
}

/// One `variables --set` per entry, in order, pausing between calls.
///
/// With `fail_fast` the loop stops after the first failure.
pub async fn set_variables<R>(runner: &R, ctx: &DeployContext) -> Vec<StepOutcome>
where
    R: CommandRunner + ?Sized,
{
    output::step(2, TOTAL_STEPS, "Setting environment variables");

    if ctx.variables.is_empty() {
        output::info("No variables configured");
        return Vec::new();
    }

    let mut results = Vec::with_capacity(ctx.variables.len());
    for (i, (key, value)) in ctx.variables.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(ctx.pause()).await;
        }

        let step = set_variable(runner, ctx, key, value).await;
        let failed = !step.succeeded();
        results.push(step);

        if failed && ctx.options.fail_fast {
            warn!(variable = key, "stopping after failed variable");
            break;
        }
    }

    info!(
        pushed = results.iter().filter(|s| s.succeeded()).count(),
        total = ctx.variables.len(),
        "variables done"
    );
    results
}

pub async fn trigger_deploy<R>(runner: &R, ctx: &DeployContext) -> StepOutcome
where
    R: CommandRunner + ?Sized,
{
    output::step(3, TOTAL_STEPS, "Starting deployment");

    let spec = ctx.deploy_command();
    let outcome = runner::run_command(runner, &spec, ctx.config.timeouts.deploy()).await;
    StepOutcome::new("deploy", &spec, outcome)
}
