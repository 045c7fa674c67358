mod cli;
mod config;
mod deploy;
mod output;
mod runner;
mod secrets;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, SecretsAction, VariablesAction};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Command::Init => {
            cli::init::run(&cli.config)?;
        }

        Command::Deploy(args) => {
            let config = config::RailupConfig::load(&cli.config)?;
            cli::deploy::run(config, args).await?;
        }

        Command::Status => {
            let config = config::RailupConfig::load(&cli.config)?;
            cli::status::run(config).await?;
        }

        Command::Variables { action } => {
            let config = config::RailupConfig::load(&cli.config)?;
            match action {
                VariablesAction::Push { fail_fast, target } => {
                    cli::variables::push(config, fail_fast, target).await?;
                }
                VariablesAction::Set { pair, target } => {
                    cli::variables::set(config, &pair, target).await?;
                }
                VariablesAction::List { reveal } => {
                    cli::variables::list(config, reveal)?;
                }
            }
        }

        Command::Secrets { action } => {
            let config = config::RailupConfig::load(&cli.config)?;
            match action {
                SecretsAction::Init => {
                    cli::secrets_cmd::init(&config)?;
                }
                SecretsAction::Set { pair } => {
                    cli::secrets_cmd::set(&config, &pair)?;
                }
                SecretsAction::Unset { key } => {
                    cli::secrets_cmd::unset(&config, &key)?;
                }
                SecretsAction::List { reveal } => {
                    cli::secrets_cmd::list(&config, reveal)?;
                }
            }
        }
    }

    Ok(())
}
