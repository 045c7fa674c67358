pub mod context;
pub mod report;
pub mod steps;

use crate::output::{self, Tone};
use crate::runner::CommandRunner;

use context::DeployContext;
use report::DeployReport;

const DASHBOARD_URL: &str = "https://railway.app/dashboard";

/// Status check, variable loop, detached deploy. Failures are recorded in
/// the report and the sequence moves on unless `fail_fast` is set.
pub async fn run<R>(runner: &R, ctx: &DeployContext) -> DeployReport
where
    R: CommandRunner + ?Sized,
{
    output::banner(&format!("Railway deploy for {}", ctx.config.project.name));

    let status = steps::check_status(runner, ctx).await;

    let variables = if ctx.options.skip_variables {
        output::step(2, steps::TOTAL_STEPS, "Setting environment variables");
        output::info("Skipped");
        Vec::new()
    } else {
        steps::set_variables(runner, ctx).await
    };

    let halted = ctx.options.fail_fast && variables.iter().any(|s| !s.succeeded());
    let deploy = if halted {
        output::result(Tone::Warning, "A variable failed to apply, not deploying");
        None
    } else {
        Some(steps::trigger_deploy(runner, ctx).await)
    };

    let report = DeployReport {
        status,
        variables,
        deploy,
    };

    println!();
    if report.deployed() {
        output::result(Tone::Success, report.final_message());
        output::hint(&format!("Check status with: {} logs", ctx.cli()));
        output::hint(&format!("Open dashboard: {}", DASHBOARD_URL));
    } else {
        output::result(Tone::Failure, report.final_message());
    }

    println!();
    output::info("Railway deploy run complete");
    report
}
