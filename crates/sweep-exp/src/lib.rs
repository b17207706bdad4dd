//! Combination expansion and execution harness for lacam parameter sweeps.

mod command;
mod driver;
mod expand;
mod harness;
mod hash;
mod invoke;
mod loader;
mod report;

pub use command::{
    CommandBuilder, DefaultValue, FieldKind, InvocationCommand, OptionalField, RequiredField,
    DEFAULT_PROGRAM, OPTIONAL_DEFAULTS, REQUIRED_FIELDS,
};
pub use driver::{drive, drive_experiment, DriveOptions};
pub use expand::{combination_at, expand, require_combination, Combinations};
pub use harness::{ExecutionOutcome, Harness, JobStatus};
pub use hash::{spec_hash, stable_hash_string};
pub use invoke::{Invoker, ProcessInvoker};
pub use loader::{ExperimentLoader, DEFAULT_EXPERIMENT_DIR};
pub use report::{read_report, write_report, JobRecord, SweepReport};
