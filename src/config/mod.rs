use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validate;
pub mod variables;

pub use variables::EnvVarSet;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SecretsConfig {
    #[serde(default)]
    pub recipients: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RailupConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub railway: RailwayConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub variables: EnvVarSet,
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Directory holding the loaded config file.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RailwayConfig {
    #[serde(default = "default_cli")]
    pub cli: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    pub environment: Option<String>,
    pub service: Option<String>,
}

impl Default for RailwayConfig {
    fn default() -> Self {
        Self {
            cli: default_cli(),
            token_env: default_token_env(),
            environment: None,
            service: None,
        }
    }
}

fn default_cli() -> String {
    "railway".to_string()
}

fn default_token_env() -> String {
    "RAILWAY_TOKEN".to_string()
}

/// Per-command timeouts, in seconds.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_status_timeout")]
    pub status: u64,
    #[serde(default = "default_variables_timeout")]
    pub variables: u64,
    #[serde(default = "default_deploy_timeout")]
    pub deploy: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            status: default_status_timeout(),
            variables: default_variables_timeout(),
            deploy: default_deploy_timeout(),
        }
    }
}

fn default_status_timeout() -> u64 {
    30
}
fn default_variables_timeout() -> u64 {
    10
}
fn default_deploy_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeployConfig {
    /// Pause between two `variables --set` calls.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_pause_ms() -> u64 {
    1000
}

impl TimeoutConfig {
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status)
    }

    pub fn variables(&self) -> Duration {
        Duration::from_secs(self.variables)
    }

    pub fn deploy(&self) -> Duration {
        Duration::from_secs(self.deploy)
    }
}

impl RailupConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.root = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        validate::validate(&config)?;
        Ok(config)
    }

    /// Directory the Railway CLI runs in. Relative paths resolve against the
    /// config file's directory.
    pub fn working_dir(&self) -> PathBuf {
        if self.project.working_dir.is_absolute() {
            self.project.working_dir.clone()
        } else {
            self.root.join(&self.project.working_dir)
        }
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.deploy.pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = RailupConfig::parse("[project]\nname = \"auto-alert\"\n").unwrap();

        assert_eq!(config.railway.cli, "railway");
        assert_eq!(config.railway.token_env, "RAILWAY_TOKEN");
        assert_eq!(config.timeouts.status(), Duration::from_secs(30));
        assert_eq!(config.timeouts.variables(), Duration::from_secs(10));
        assert_eq!(config.timeouts.deploy(), Duration::from_secs(120));
        assert_eq!(config.pause(), Duration::from_secs(1));
        assert!(config.variables.is_empty());
    }

    #[test]
    fn full_config() {
        let config = RailupConfig::parse(
            r#"
[project]
name = "auto-alert"
working_dir = "backend"

[railway]
cli = "/opt/bin/railway"
environment = "production"
service = "api"

[timeouts]
deploy = 300

[deploy]
pause_ms = 250

[variables]
NODE_ENV = "production"
PORT = "3001"
"#,
        )
        .unwrap();

        assert_eq!(config.railway.cli, "/opt/bin/railway");
        assert_eq!(config.railway.environment.as_deref(), Some("production"));
        assert_eq!(config.railway.service.as_deref(), Some("api"));
        assert_eq!(config.timeouts.deploy(), Duration::from_secs(300));
        assert_eq!(config.timeouts.status(), Duration::from_secs(30));
        assert_eq!(config.pause(), Duration::from_millis(250));
        assert_eq!(config.variables.get("PORT"), Some("3001"));
    }

    #[test]
    fn working_dir_is_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("railup.toml");
        std::fs::write(
            &path,
            "[project]\nname = \"auto-alert\"\nworking_dir = \"app\"\n",
        )
        .unwrap();

        let config = RailupConfig::load(&path).unwrap();
        assert_eq!(config.working_dir(), dir.path().join("app"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RailupConfig::load(Path::new("/nonexistent/railup.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/railup.toml"));
    }
}
