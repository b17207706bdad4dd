use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sweep_core::errors::{ErrorInfo, SweepError};
use sweep_core::Combination;

use crate::command::InvocationCommand;
use crate::harness::{ExecutionOutcome, JobStatus};

/// Record of a single combination handed to the harness.
///
/// `params` keeps the spec's declaration order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub index: usize,
    pub params: Combination,
    pub command: InvocationCommand,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SweepError>,
}

/// Summary of a sweep: what was attempted and how each attempt ended.
///
/// The external program's own result files are not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub spec_hash: String,
    pub dry_run: bool,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

impl SweepReport {
    pub fn new(spec_hash: impl Into<String>, dry_run: bool) -> Self {
        Self {
            spec_hash: spec_hash.into(),
            dry_run,
            total: 0,
            succeeded: 0,
            failed: 0,
            jobs: Vec::new(),
        }
    }

    /// Updates the counters for `outcome`, keeping the full record only
    /// when `keep_job` is set.
    pub fn record(
        &mut self,
        index: usize,
        params: &Combination,
        outcome: &ExecutionOutcome,
        keep_job: bool,
    ) {
        self.total += 1;
        match outcome.status() {
            JobStatus::Succeeded => self.succeeded += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::DryRun => {}
        }
        if keep_job {
            self.jobs.push(JobRecord {
                index,
                params: params.clone(),
                command: outcome.command().clone(),
                status: outcome.status(),
                error: outcome.error().cloned(),
            });
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Persists `report` as compact JSON, creating parent directories.
pub fn write_report(path: &Path, report: &SweepReport) -> Result<(), SweepError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                SweepError::Io(
                    ErrorInfo::new("report-create", "failed to create report directory")
                        .with_context("path", parent.display().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
        }
    }
    let bytes = serde_json::to_vec(report)
        .map_err(|err| SweepError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
    fs::write(path, bytes).map_err(|err| {
        SweepError::Io(
            ErrorInfo::new("report-write", "failed to write sweep report")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

/// Reads back a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<SweepReport, SweepError> {
    let bytes = fs::read(path).map_err(|err| {
        SweepError::Io(
            ErrorInfo::new("report-read", "failed to read sweep report")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        SweepError::Serde(
            ErrorInfo::new("json-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}
