#![deny(missing_docs)]
#![doc = "Core parameter model and structured errors for the lacam parameter sweep runner."]

pub mod errors;
pub mod value;

pub use errors::{ErrorInfo, SweepError};
pub use value::{Combination, ParamValue, ParameterSpec, Scalar};
