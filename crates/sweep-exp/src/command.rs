use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use sweep_core::errors::{ErrorInfo, SweepError};
use sweep_core::{Combination, ParameterSpec, Scalar};

/// Executable invoked for every combination unless overridden.
pub const DEFAULT_PROGRAM: &str = "./build/main";

/// Expected scalar shape of a field consulted by the command builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Forwarded as `--flag <string>`.
    Str,
    /// Forwarded as `--flag <integer>`.
    Int,
    /// Forwarded as a bare `--flag` when true, omitted otherwise.
    Presence,
}

/// A field that must be present in every combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    pub key: &'static str,
    pub flag: &'static str,
    pub kind: FieldKind,
}

/// Fallback used when an optional field is absent from a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Int(i64),
    Str(&'static str),
    Flag(bool),
}

impl DefaultValue {
    fn to_scalar(self) -> Scalar {
        match self {
            DefaultValue::Int(value) => Scalar::Int(value),
            DefaultValue::Str(value) => Scalar::from(value),
            DefaultValue::Flag(value) => Scalar::Bool(value),
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            DefaultValue::Int(_) => FieldKind::Int,
            DefaultValue::Str(_) => FieldKind::Str,
            DefaultValue::Flag(_) => FieldKind::Presence,
        }
    }
}

/// A field with a documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalField {
    pub key: &'static str,
    pub flag: &'static str,
    pub default: DefaultValue,
}

/// Required fields, in the order their flags appear on the command line.
pub const REQUIRED_FIELDS: [RequiredField; 6] = [
    RequiredField {
        key: "map",
        flag: "--map",
        kind: FieldKind::Str,
    },
    RequiredField {
        key: "cache",
        flag: "--cache",
        kind: FieldKind::Str,
    },
    RequiredField {
        key: "ngoals",
        flag: "--ngoals",
        kind: FieldKind::Int,
    },
    RequiredField {
        key: "goals_k",
        flag: "--goals-k",
        kind: FieldKind::Int,
    },
    RequiredField {
        key: "goals_m",
        flag: "--goals-m",
        kind: FieldKind::Int,
    },
    RequiredField {
        key: "nagents",
        flag: "--nagents",
        kind: FieldKind::Int,
    },
];

/// Optional fields and their defaults, in command-line order after the
/// required fields.
pub const OPTIONAL_DEFAULTS: [OptionalField; 6] = [
    OptionalField {
        key: "seed",
        flag: "--seed",
        default: DefaultValue::Int(0),
    },
    OptionalField {
        key: "time_limit_sec",
        flag: "--time_limit_sec",
        default: DefaultValue::Int(10),
    },
    OptionalField {
        key: "output_step_result",
        flag: "--output_step_result",
        default: DefaultValue::Str("./result/step_result.txt"),
    },
    OptionalField {
        key: "output_csv_result",
        flag: "--output_csv_result",
        default: DefaultValue::Str("./result/result.csv"),
    },
    OptionalField {
        key: "log_short",
        flag: "--log_short",
        default: DefaultValue::Flag(false),
    },
    OptionalField {
        key: "debug",
        flag: "--debug",
        default: DefaultValue::Flag(false),
    },
];

/// Argument vector for one external invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InvocationCommand {
    /// Program followed by its arguments.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl Display for InvocationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.tokens().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// Maps a [`Combination`] to the external program's argument vector.
///
/// Construction is pure: the same combination always yields the same
/// tokens in the same order. Keys that no table mentions are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    program: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Builds the invocation for `params`.
    pub fn build(&self, params: &Combination) -> Result<InvocationCommand, SweepError> {
        let mut args = Vec::with_capacity(2 * (REQUIRED_FIELDS.len() + OPTIONAL_DEFAULTS.len()));
        for field in &REQUIRED_FIELDS {
            let value = params
                .get(field.key)
                .ok_or_else(|| missing_field(field.key))?;
            push_field(&mut args, field.key, field.flag, field.kind, value)?;
        }
        for field in &OPTIONAL_DEFAULTS {
            let fallback;
            let value = match params.get(field.key) {
                Some(value) => value,
                None => {
                    fallback = field.default.to_scalar();
                    &fallback
                }
            };
            push_field(&mut args, field.key, field.flag, field.default.kind(), value)?;
        }
        Ok(InvocationCommand {
            program: self.program.clone(),
            args,
        })
    }

    /// Checks every candidate value of every field the tables mention, so a
    /// spec that cannot produce a command for some combination is rejected
    /// before any combination runs.
    pub fn validate(&self, spec: &ParameterSpec) -> Result<(), SweepError> {
        for field in &REQUIRED_FIELDS {
            let value = spec.get(field.key).ok_or_else(|| missing_field(field.key))?;
            for candidate in value.values() {
                check_kind(field.key, field.kind, candidate)?;
            }
        }
        for field in &OPTIONAL_DEFAULTS {
            if let Some(value) = spec.get(field.key) {
                for candidate in value.values() {
                    check_kind(field.key, field.default.kind(), candidate)?;
                }
            }
        }
        Ok(())
    }
}

fn push_field(
    args: &mut Vec<String>,
    key: &str,
    flag: &str,
    kind: FieldKind,
    value: &Scalar,
) -> Result<(), SweepError> {
    check_kind(key, kind, value)?;
    match value {
        Scalar::Bool(enabled) => {
            if *enabled {
                args.push(flag.to_string());
            }
        }
        other => {
            args.push(flag.to_string());
            args.push(other.to_string());
        }
    }
    Ok(())
}

fn check_kind(key: &str, kind: FieldKind, value: &Scalar) -> Result<(), SweepError> {
    match (kind, value) {
        (FieldKind::Str, Scalar::Str(_))
        | (FieldKind::Int, Scalar::Int(_))
        | (FieldKind::Presence, Scalar::Bool(_)) => Ok(()),
        (kind, other) => Err(SweepError::InvalidSpecification(
            ErrorInfo::new("field-type", "field has the wrong scalar type")
                .with_context("field", key)
                .with_context("expected", kind_name(kind))
                .with_context("found", other.kind())
                .with_context("value", other.to_string()),
        )),
    }
}

fn missing_field(key: &str) -> SweepError {
    SweepError::InvalidSpecification(
        ErrorInfo::new("missing-required-field", "required field is absent")
            .with_context("field", key),
    )
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Str => "string",
        FieldKind::Int => "integer",
        FieldKind::Presence => "boolean",
    }
}
