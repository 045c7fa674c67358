pub mod exec;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::output::{self, Tone};

pub use exec::RailwayCli;

/// Arguments for one Railway CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Values masked when a `KEY=VALUE` argument is displayed.
    redact: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            redact: Vec::new(),
        }
    }

    pub fn redacting(mut self, secret: &str) -> Self {
        if !secret.is_empty() {
            self.redact.push(secret.to_string());
        }
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            let shown = match arg.split_once('=') {
                Some((key, value)) if self.redact.iter().any(|s| s == value) => {
                    format!("{}=****", key)
                }
                _ => arg.clone(),
            };
            if needs_quotes(&shown) {
                write!(f, " \"{}\"", shown.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", shown)?;
            }
        }
        Ok(())
    }
}

fn needs_quotes(arg: &str) -> bool {
    arg.is_empty()
        || !arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':'))
}

/// Outcome of one subprocess call. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success { stdout: String },
    Failed { code: Option<i32>, stderr: String },
    TimedOut { timeout: Duration },
    Error { message: String },
}

impl CommandOutcome {
    /// Captured stdout, present only when the command exited 0.
    pub fn stdout(&self) -> Option<&str> {
        match self {
            CommandOutcome::Success { stdout } => Some(stdout),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success { .. })
    }

    pub fn tone(&self) -> Tone {
        match self {
            CommandOutcome::Success { .. } => Tone::Success,
            CommandOutcome::TimedOut { .. } => Tone::Warning,
            CommandOutcome::Failed { .. } | CommandOutcome::Error { .. } => Tone::Failure,
        }
    }

    /// The line printed after the command finishes.
    pub fn summary(&self) -> String {
        match self {
            CommandOutcome::Success { stdout } => format!("Success: {}", stdout.trim_end()),
            CommandOutcome::Failed { stderr, .. } => format!("Error: {}", stderr.trim_end()),
            CommandOutcome::TimedOut { timeout } => {
                format!("Timeout after {}s", timeout.as_secs_f64())
            }
            CommandOutcome::Error { message } => format!("Exception: {}", message),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion or until `timeout` expires.
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> CommandOutcome;
}

/// Run one command, printing what runs and how it ended.
pub async fn run_command<R>(runner: &R, spec: &CommandSpec, timeout: Duration) -> CommandOutcome
where
    R: CommandRunner + ?Sized,
{
    output::info(&format!("Executing: {}", spec));

    let spinner = output::is_interactive().then(|| output::create_spinner("Waiting for Railway..."));
    let outcome = runner.run(spec, timeout).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let CommandOutcome::Failed { code, .. } = &outcome {
        debug!(command = %spec, ?code, "non-zero exit");
    }

    output::result(outcome.tone(), &outcome.summary());
    outcome
}


#[cfg(test)]
mod tests {
    use super::testing::{fail, ok, ScriptedRunner};
    use super::*;

    #[test]
    fn displays_like_a_shell_line() {
        let spec = CommandSpec::new("railway", ["variables", "--set", "PORT=3001"]);
        assert_eq!(spec.to_string(), "railway variables --set \"PORT=3001\"");

        let spec = CommandSpec::new("railway", ["up", "--detach"]);
        assert_eq!(spec.to_string(), "railway up --detach");
    }

    #[test]
    fn display_masks_redacted_values() {
        let spec = CommandSpec::new("railway", ["variables", "--set", "WEBHOOK_SECRET=hunter2"])
            .redacting("hunter2");
        assert_eq!(
            spec.to_string(),
            "railway variables --set \"WEBHOOK_SECRET=****\""
        );
        assert_eq!(spec.args[2], "WEBHOOK_SECRET=hunter2");
    }

    #[test]
    fn display_masks_the_value_not_the_key() {
        let spec = CommandSpec::new("railway", ["variables", "--set", "WEBHOOK_SECRET=SECRET"])
            .redacting("SECRET");
        assert_eq!(
            spec.to_string(),
            "railway variables --set \"WEBHOOK_SECRET=****\""
        );

        let spec = CommandSpec::new("railway", ["variables", "--set", "API_KEY=key-abc"])
            .redacting("key");
        assert_eq!(
            spec.to_string(),
            "railway variables --set \"API_KEY=key-abc\""
        );
    }

    #[test]
    fn only_success_carries_stdout() {
        assert_eq!(ok("linked\n").stdout(), Some("linked\n"));
        assert_eq!(fail("boom").stdout(), None);
        assert_eq!(
            CommandOutcome::TimedOut {
                timeout: Duration::from_secs(10)
            }
            .stdout(),
            None
        );
        assert_eq!(
            CommandOutcome::Error {
                message: "not found".into()
            }
            .stdout(),
            None
        );
    }

    #[test]
    fn summaries() {
        assert_eq!(fail("Unauthorized\n").summary(), "Error: Unauthorized");
        assert_eq!(
            CommandOutcome::TimedOut {
                timeout: Duration::from_secs(120)
            }
            .summary(),
            "Timeout after 120s"
        );
        assert_eq!(
            CommandOutcome::Error {
                message: "No such file or directory".into()
            }
            .summary(),
            "Exception: No such file or directory"
        );
    }

    #[test]
    fn tones() {
        assert_eq!(ok("").tone(), Tone::Success);
        assert_eq!(fail("x").tone(), Tone::Failure);
        assert_eq!(
            CommandOutcome::TimedOut {
                timeout: Duration::from_secs(1)
            }
            .tone(),
            Tone::Warning
        );
        assert_eq!(
            CommandOutcome::Error {
                message: "gone".into()
            }
            .tone(),
            Tone::Failure
        );
    }

    #[tokio::test]
    async fn run_command_passes_outcome_through() {
        let runner = ScriptedRunner::new([fail("not linked")]);
        let spec = CommandSpec::new("railway", ["status"]);

        let outcome = run_command(&runner, &spec, Duration::from_secs(30)).await;

        assert_eq!(outcome, fail("not linked"));
        assert_eq!(runner.calls(), vec![(spec, Duration::from_secs(30))]);
    }
}
