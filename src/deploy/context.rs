use std::collections::BTreeMap;
use std::time::Duration;

use age::secrecy::SecretString;
use tracing::debug;

use crate::config::{EnvVarSet, RailupConfig};
use crate::runner::CommandSpec;

/// Per-invocation switches from the command line.
#[derive(Debug, Default, Clone)]
pub struct DeployOptions {
    /// Stop at the first failed variable instead of carrying on.
    pub fail_fast: bool,
    /// Turn a failed run into a non-zero exit.
    pub strict: bool,
    pub skip_variables: bool,
    pub environment: Option<String>,
    pub service: Option<String>,
}

pub struct DeployContext {
    pub config: RailupConfig,
    pub options: DeployOptions,
    /// Plain variables with decrypted secrets merged in.
    pub variables: EnvVarSet,
    secret_values: Vec<String>,
}

impl DeployContext {
    /// Build the context and pull the token out of `secrets` if it lives there.
    pub fn new(
        config: RailupConfig,
        options: DeployOptions,
        mut secrets: BTreeMap<String, String>,
    ) -> (Self, Option<SecretString>) {
        let token = resolve_token(&config.railway.token_env, &mut secrets);

        let mut variables = config.variables.clone();
        variables.merge_secrets(&secrets);

        let ctx = Self {
            config,
            options,
            variables,
            secret_values: secrets.into_values().collect(),
        };
        (ctx, token)
    }

    pub fn cli(&self) -> &str {
        &self.config.railway.cli
    }

    pub fn environment(&self) -> Option<&str> {
        self.options
            .environment
            .as_deref()
            .or(self.config.railway.environment.as_deref())
    }

    pub fn service(&self) -> Option<&str> {
        self.options
            .service
            .as_deref()
            .or(self.config.railway.service.as_deref())
    }

    pub fn pause(&self) -> Duration {
        self.config.pause()
    }

    pub fn is_secret(&self, value: &str) -> bool {
        self.secret_values.iter().any(|s| s == value)
    }

    fn target_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(env) = self.environment() {
            args.extend(["--environment".to_string(), env.to_string()]);
        }
        if let Some(service) = self.service() {
            args.extend(["--service".to_string(), service.to_string()]);
        }
        args
    }

    pub fn status_command(&self) -> CommandSpec {
        CommandSpec::new(self.cli(), ["status"])
    }

    pub fn set_variable_command(&self, key: &str, value: &str) -> CommandSpec {
        let mut args = vec![
            "variables".to_string(),
            "--set".to_string(),
            format!("{}={}", key, value),
        ];
        args.extend(self.target_args());

        let spec = CommandSpec::new(self.cli(), args);
        if self.is_secret(value) {
            spec.redacting(value)
        } else {
            spec
        }
    }

    pub fn deploy_command(&self) -> CommandSpec {
        let mut args = vec!["up".to_string(), "--detach".to_string()];
        args.extend(self.target_args());
        CommandSpec::new(self.cli(), args)
    }
}

/// Environment first, then the secret store. The token never becomes a
/// pushed variable.
fn resolve_token(token_env: &str, secrets: &mut BTreeMap<String, String>) -> Option<SecretString> {
    let stored = secrets.remove(token_env);

    if let Ok(value) = std::env::var(token_env) {
        if !value.trim().is_empty() {
            debug!("using token from ${}", token_env);
            return Some(SecretString::from(value));
        }
    }

    stored.map(|value| {
        debug!("using token from secret store");
        SecretString::from(value)
    })
}

#[cfg(test)]
mod tests {
    use age::secrecy::ExposeSecret;

    use super::*;

    fn config(extra: &str) -> RailupConfig {
        RailupConfig::parse(&format!(
            "[project]\nname = \"auto-alert\"\n{}\n[variables]\nNODE_ENV = \"production\"\nPORT = \"3001\"\n",
            extra
        ))
        .unwrap()
    }

    #[test]
    fn builds_the_three_commands() {
        let (ctx, _) = DeployContext::new(config(""), DeployOptions::default(), BTreeMap::new());

        assert_eq!(ctx.status_command().args, ["status"]);
        assert_eq!(
            ctx.set_variable_command("PORT", "3001").args,
            ["variables", "--set", "PORT=3001"]
        );
        assert_eq!(ctx.deploy_command().args, ["up", "--detach"]);
    }

    #[test]
    fn targeting_flags_come_from_config_and_options() {
        let cfg = config("[railway]\nenvironment = \"staging\"\nservice = \"api\"\n");
        let options = DeployOptions {
            environment: Some("production".into()),
            ..Default::default()
        };
        let (ctx, _) = DeployContext::new(cfg, options, BTreeMap::new());

        assert_eq!(
            ctx.deploy_command().args,
            ["up", "--detach", "--environment", "production", "--service", "api"]
        );
        assert_eq!(ctx.status_command().args, ["status"]);
    }

    #[test]
    fn secrets_are_merged_and_masked() {
        let secrets = BTreeMap::from([("WEBHOOK_SECRET".to_string(), "w3bh00k".to_string())]);
        let (ctx, _) = DeployContext::new(config(""), DeployOptions::default(), secrets);

        let keys: Vec<&str> = ctx.variables.keys().collect();
        assert_eq!(keys, ["NODE_ENV", "PORT", "WEBHOOK_SECRET"]);

        let spec = ctx.set_variable_command("WEBHOOK_SECRET", "w3bh00k");
        assert_eq!(spec.args[2], "WEBHOOK_SECRET=w3bh00k");
        assert!(!spec.to_string().contains("w3bh00k"));
    }

    #[test]
    fn stored_token_is_used_and_not_pushed() {
        let cfg = config("[railway]\ntoken_env = \"RAILUP_CTX_TEST_STORED_TOKEN\"\n");
        let secrets = BTreeMap::from([(
            "RAILUP_CTX_TEST_STORED_TOKEN".to_string(),
            "from-store".to_string(),
        )]);

        let (ctx, token) = DeployContext::new(cfg, DeployOptions::default(), secrets);

        assert_eq!(token.unwrap().expose_secret(), "from-store");
        assert!(ctx.variables.get("RAILUP_CTX_TEST_STORED_TOKEN").is_none());
    }

    #[test]
    fn environment_token_wins() {
        std::env::set_var("RAILUP_CTX_TEST_ENV_TOKEN", "from-env");
        let cfg = config("[railway]\ntoken_env = \"RAILUP_CTX_TEST_ENV_TOKEN\"\n");
        let secrets = BTreeMap::from([(
            "RAILUP_CTX_TEST_ENV_TOKEN".to_string(),
            "from-store".to_string(),
        )]);

        let (_, token) = DeployContext::new(cfg, DeployOptions::default(), secrets);
        std::env::remove_var("RAILUP_CTX_TEST_ENV_TOKEN");

        assert_eq!(token.unwrap().expose_secret(), "from-env");
    }

    #[test]
    fn no_token_anywhere() {
        let cfg = config("[railway]\ntoken_env = \"RAILUP_CTX_TEST_NO_TOKEN\"\n");
        let (_, token) = DeployContext::new(cfg, DeployOptions::default(), BTreeMap::new());
        assert!(token.is_none());
    }
}
