use sweep_core::{ParameterSpec, SweepError};
use tracing::{info, warn};

use crate::expand::{expand, require_combination};
use crate::harness::Harness;
use crate::hash::spec_hash;
use crate::invoke::Invoker;
use crate::loader::ExperimentLoader;
use crate::report::SweepReport;

/// Knobs for a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveOptions {
    /// Run only the combination at this index.
    pub only: Option<usize>,
    /// Keep a [`crate::JobRecord`] per combination in the report. Off by
    /// default so memory stays flat on large sweeps.
    pub record_jobs: bool,
}

/// Streams every combination of `spec` through `harness`, one at a time.
///
/// Every field the command builder consults is type-checked across all of
/// its candidate values first, so a malformed spec fails before the
/// external program runs even once. After that, per-combination failures
/// are counted and the loop moves on; the sweep ends normally after the last
/// combination however many failed.
pub fn drive<I: Invoker>(
    spec: &ParameterSpec,
    harness: &mut Harness<I>,
    options: &DriveOptions,
) -> Result<SweepReport, SweepError> {
    harness.builder().validate(spec)?;
    let mut report = SweepReport::new(spec_hash(spec)?, harness.is_dry_run());
    if let Some(index) = options.only {
        let params = require_combination(spec, index)?;
        let outcome = harness.run(&params)?;
        report.record(index, &params, &outcome, options.record_jobs);
    } else {
        let combinations = expand(spec)?;
        info!("Sweeping {} combinations", combinations.total());
        for (index, params) in combinations.enumerate() {
            let outcome = harness.run(&params)?;
            report.record(index, &params, &outcome, options.record_jobs);
        }
    }
    if report.has_failures() {
        warn!("{} of {} combinations failed", report.failed, report.total);
    }
    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "Sweep finished"
    );
    Ok(report)
}

/// Loads the experiment `name` and drives it.
///
/// A loader failure is returned before any combination is attempted.
pub fn drive_experiment<I: Invoker>(
    loader: &ExperimentLoader,
    name: &str,
    harness: &mut Harness<I>,
    options: &DriveOptions,
) -> Result<SweepReport, SweepError> {
    let spec = loader.load(name)?;
    drive(&spec, harness, options)
}
