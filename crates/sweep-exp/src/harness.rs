use serde::{Deserialize, Serialize};
use sweep_core::{Combination, SweepError};
use tracing::{error, info};

use crate::command::{CommandBuilder, InvocationCommand};
use crate::invoke::Invoker;

/// Result of handing one combination to the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The command was reported but not run.
    DryRun { command: InvocationCommand },
    /// The external program exited successfully.
    Succeeded { command: InvocationCommand },
    /// The external program failed or could not be started.
    Failed {
        command: InvocationCommand,
        error: SweepError,
    },
}

/// Status label recorded in sweep reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    DryRun,
    Succeeded,
    Failed,
}

impl ExecutionOutcome {
    pub fn command(&self) -> &InvocationCommand {
        match self {
            ExecutionOutcome::DryRun { command }
            | ExecutionOutcome::Succeeded { command }
            | ExecutionOutcome::Failed { command, .. } => command,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            ExecutionOutcome::DryRun { .. } => JobStatus::DryRun,
            ExecutionOutcome::Succeeded { .. } => JobStatus::Succeeded,
            ExecutionOutcome::Failed { .. } => JobStatus::Failed,
        }
    }

    pub fn error(&self) -> Option<&SweepError> {
        match self {
            ExecutionOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed { .. })
    }
}

/// Builds and issues the external invocation for one combination at a time.
///
/// Failures of the external program are contained: [`Harness::run`] turns
/// them into [`ExecutionOutcome::Failed`] instead of an error, so callers can
/// keep going with the remaining combinations. Only command construction
/// errors (and invoker errors that are not invocation failures) propagate.
#[derive(Debug)]
pub struct Harness<I> {
    builder: CommandBuilder,
    invoker: I,
    dry_run: bool,
}

impl<I: Invoker> Harness<I> {
    pub fn new(builder: CommandBuilder, invoker: I, dry_run: bool) -> Self {
        Self {
            builder,
            invoker,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn into_invoker(self) -> I {
        self.invoker
    }

    /// Runs (or, in dry-run mode, reports) the command for `params`.
    pub fn run(&mut self, params: &Combination) -> Result<ExecutionOutcome, SweepError> {
        let command = self.builder.build(params)?;
        if self.dry_run {
            info!("Dry run command: {command}");
            return Ok(ExecutionOutcome::DryRun { command });
        }
        info!("Executing: {command}");
        match self.invoker.invoke(&command) {
            Ok(()) => Ok(ExecutionOutcome::Succeeded { command }),
            Err(err) if !err.is_fatal() => {
                error!("Experiment failed with error: {err}");
                Ok(ExecutionOutcome::Failed {
                    command,
                    error: err,
                })
            }
            Err(err) => Err(err),
        }
    }
}
