use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use sweep_core::errors::{ErrorInfo, SweepError};
use tracing::debug;

use crate::command::InvocationCommand;

/// Capability to run one external invocation to completion.
///
/// Implementations block until the program exits and map any failure,
/// including a failure to start, to [`SweepError::ExternalInvocationFailed`].
pub trait Invoker {
    fn invoke(&mut self, command: &InvocationCommand) -> Result<(), SweepError>;
}

impl<T: Invoker + ?Sized> Invoker for &mut T {
    fn invoke(&mut self, command: &InvocationCommand) -> Result<(), SweepError> {
        (**self).invoke(command)
    }
}

impl<T: Invoker + ?Sized> Invoker for Box<T> {
    fn invoke(&mut self, command: &InvocationCommand) -> Result<(), SweepError> {
        (**self).invoke(command)
    }
}

/// Runs commands as child processes sharing this process's stdio.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInvoker {
    current_dir: Option<PathBuf>,
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs children from `dir` instead of the current directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, command: &InvocationCommand) -> Result<(), SweepError> {
        let mut child = Command::new(&command.program);
        child.args(&command.args);
        if let Some(dir) = &self.current_dir {
            child.current_dir(dir);
        }
        debug!(program = %command.program, args = command.args.len(), "spawning");
        let status = child.status().map_err(|err| {
            SweepError::ExternalInvocationFailed(
                ErrorInfo::new("invoke-spawn", "failed to start external program")
                    .with_context("command", command.to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        check_status(command, status)
    }
}

fn check_status(command: &InvocationCommand, status: ExitStatus) -> Result<(), SweepError> {
    if status.success() {
        return Ok(());
    }
    let info = match status.code() {
        Some(code) => ErrorInfo::new("invoke-exit-status", "external program exited unsuccessfully")
            .with_context("status", code.to_string()),
        None => ErrorInfo::new("invoke-signal", "external program was terminated by a signal")
            .with_context("status", status.to_string()),
    };
    Err(SweepError::ExternalInvocationFailed(
        info.with_context("command", command.to_string()),
    ))
}
