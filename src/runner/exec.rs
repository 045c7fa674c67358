use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use age::secrecy::{ExposeSecret, SecretString};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{CommandOutcome, CommandRunner, CommandSpec};

/// Runs the Railway CLI as a child process.
pub struct RailwayCli {
    working_dir: PathBuf,
    token_env: String,
    token: Option<SecretString>,
}

impl RailwayCli {
    pub fn new(working_dir: PathBuf, token_env: &str, token: Option<SecretString>) -> Self {
        Self {
            working_dir,
            token_env: token_env.to_string(),
            token,
        }
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(token) = &self.token {
            cmd.env(&self.token_env, token.expose_secret());
        }

        cmd
    }
}

#[async_trait]
impl CommandRunner for RailwayCli {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> CommandOutcome {
        debug!("exec in {}: {}", self.working_dir.display(), spec);
        let started = Instant::now();

        let child = match self.command(spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::Error {
                    message: format!("failed to start '{}': {}", spec.program, e),
                }
            }
        };

        // Dropping the wait future on expiry kills the child.
        let result = tokio::time::timeout(timeout, child.wait_with_output()).await;
        debug!("{} finished after {:?}", spec.program, started.elapsed());

        match result {
            Ok(Ok(output)) if output.status.success() => CommandOutcome::Success {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            },
            Ok(Ok(output)) => CommandOutcome::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            Ok(Err(e)) => CommandOutcome::Error {
                message: format!("failed to wait for '{}': {}", spec.program, e),
            },
            Err(_) => CommandOutcome::TimedOut { timeout },
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    fn runner() -> RailwayCli {
        RailwayCli::new(std::env::temp_dir(), "RAILWAY_TOKEN", None)
    }

    #[tokio::test]
    async fn zero_exit_returns_stdout() {
        let outcome = runner().run(&sh("echo deployed"), Duration::from_secs(5)).await;
        assert_eq!(outcome.stdout(), Some("deployed\n"));
    }

    #[tokio::test]
    async fn non_zero_exit_captures_stderr() {
        let outcome = runner()
            .run(&sh("echo 'Project not linked' >&2; exit 3"), Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                code: Some(3),
                stderr: "Project not linked\n".to_string(),
            }
        );
        assert!(outcome.summary().contains("Project not linked"));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let started = Instant::now();
        let outcome = runner()
            .run(&sh("sleep 5"), Duration::from_millis(200))
            .await;

        assert_eq!(
            outcome,
            CommandOutcome::TimedOut {
                timeout: Duration::from_millis(200)
            }
        );
        assert!(outcome.stdout().is_none());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn missing_binary_is_an_error_outcome() {
        let spec = CommandSpec::new("railup-definitely-missing-binary", ["status"]);
        let outcome = runner().run(&spec, Duration::from_secs(5)).await;

        match outcome {
            CommandOutcome::Error { message } => {
                assert!(message.contains("railup-definitely-missing-binary"))
            }
            other => panic!("expected error outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn token_is_exported_to_the_child_only() {
        let cli = RailwayCli::new(
            std::env::temp_dir(),
            "RAILUP_TEST_TOKEN",
            Some(SecretString::from("tok-123".to_string())),
        );

        let outcome = cli
            .run(&sh("printf %s \"$RAILUP_TEST_TOKEN\""), Duration::from_secs(5))
            .await;

        assert_eq!(outcome.stdout(), Some("tok-123"));
        assert!(std::env::var("RAILUP_TEST_TOKEN").is_err());
    }

    #[tokio::test]
    async fn runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let cli = RailwayCli::new(dir.path().to_path_buf(), "RAILWAY_TOKEN", None);

        let outcome = cli.run(&sh("ls"), Duration::from_secs(5)).await;
        assert_eq!(outcome.stdout(), Some("marker\n"));
    }
}
