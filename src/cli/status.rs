use anyhow::Result;

use crate::config::RailupConfig;
use crate::deploy::context::DeployOptions;
use crate::deploy::steps;

pub async fn run(config: RailupConfig) -> Result<()> {
    let (ctx, cli) = super::deploy::prepare(config, DeployOptions::default())?;
    steps::check_status(&cli, &ctx).await;
    Ok(())
}
