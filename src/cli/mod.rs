use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod deploy;
pub mod init;
pub mod secrets_cmd;
pub mod status;
pub mod variables;

#[derive(Parser)]
#[command(name = "railup", version, about = "Push variables and deploy through the Railway CLI")]
pub struct Cli {
    /// Path to railup.toml
    #[arg(short, long, default_value = "railup.toml", global = true)]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scaffold railup.toml in the current directory
    Init,

    /// Check status, push variables, then `railway up --detach`
    Deploy(DeployArgs),

    /// Show `railway status` for the linked project
    Status,

    /// Push or inspect environment variables
    Variables {
        #[command(subcommand)]
        action: VariablesAction,
    },

    /// Manage encrypted secrets (age-encrypted .env)
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Railway environment (overrides railway.environment)
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Railway service (overrides railway.service)
    #[arg(long)]
    pub service: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Stop at the first variable that fails to apply
    #[arg(long)]
    pub fail_fast: bool,

    /// Exit non-zero when the deploy did not go through
    #[arg(long)]
    pub strict: bool,

    /// Deploy without pushing variables
    #[arg(long)]
    pub skip_variables: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Subcommand)]
pub enum VariablesAction {
    /// Push every configured variable (plain and secret)
    Push {
        /// Stop at the first variable that fails to apply
        #[arg(long)]
        fail_fast: bool,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Push a single variable
    Set {
        /// KEY=VALUE pair
        pair: String,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show the variables a deploy would push
    List {
        /// Show secret values
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Subcommand)]
pub enum SecretsAction {
    /// Generate age keypair and show setup instructions
    Init,
    /// Set a secret (KEY=VALUE)
    Set {
        /// KEY=VALUE pair
        pair: String,
    },
    /// Remove a secret
    Unset {
        /// Secret key name
        key: String,
    },
    /// List secrets (values masked by default)
    List {
        /// Show actual values
        #[arg(long)]
        reveal: bool,
    },
}

/// Values shorter than this are masked completely.
const MASK_MIN_CHARS: usize = 12;

/// Show the first 4 characters followed by "****", or just "****" for short values.
pub fn mask_value(value: &str) -> String {
    if value.chars().count() < MASK_MIN_CHARS {
        return "****".to_string();
    }
    match value.char_indices().nth(4) {
        Some((idx, _)) => format!("{}****", &value[..idx]),
        None => "****".to_string(),
    }
}
