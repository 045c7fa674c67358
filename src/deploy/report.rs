use thiserror::Error;

use crate::runner::{CommandOutcome, CommandSpec};

pub const SUCCESS_MESSAGE: &str = "Deployment initiated successfully!";
pub const FAILURE_MESSAGE: &str = "Deployment failed - check Railway CLI manually";

/// One executed command and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub label: String,
    pub command: String,
    pub outcome: CommandOutcome,
}

impl StepOutcome {
    pub fn new(label: impl Into<String>, spec: &CommandSpec, outcome: CommandOutcome) -> Self {
        Self {
            label: label.into(),
            command: spec.to_string(),
            outcome,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub status: StepOutcome,
    pub variables: Vec<StepOutcome>,
    /// `None` when the run halted before the deploy command.
    pub deploy: Option<StepOutcome>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeployError {
    #[error("deploy did not go through: {0}")]
    DeployFailed(String),
    #[error("halted after {step} failed: {detail}")]
    Halted { step: String, detail: String },
}

impl DeployReport {
    /// True when the deploy command returned a non-empty result.
    pub fn deployed(&self) -> bool {
        self.deploy
            .as_ref()
            .and_then(|step| step.outcome.stdout())
            .is_some_and(|out| !out.is_empty())
    }

    pub fn failures(&self) -> Vec<&StepOutcome> {
        std::iter::once(&self.status)
            .chain(&self.variables)
            .chain(&self.deploy)
            .filter(|s| !s.succeeded())
            .collect()
    }

    pub fn final_message(&self) -> &'static str {
        if self.deployed() {
            SUCCESS_MESSAGE
        } else {
            FAILURE_MESSAGE
        }
    }

    /// Strict reading of the report: anything short of a deploy is an error.
    pub fn into_result(self) -> Result<Self, DeployError> {
        let error = match &self.deploy {
            Some(_) if self.deployed() => None,
            Some(step) if step.succeeded() => Some(DeployError::DeployFailed(
                "deploy command returned no output".to_string(),
            )),
            Some(step) => Some(DeployError::DeployFailed(step.outcome.summary())),
            None => {
                let failed = self
                    .variables
                    .iter()
                    .find(|s| !s.succeeded())
                    .unwrap_or(&self.status);
                Some(DeployError::Halted {
                    step: failed.label.clone(),
                    detail: failed.outcome.summary(),
                })
            }
        };

        match error {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}
