//! Structured error types shared across the sweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SweepError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, paths, commands, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sweep runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// The named experiment could not be resolved to a document.
    #[error("specification not found: {0}")]
    SpecificationNotFound(ErrorInfo),
    /// Malformed parameter shapes, unparsable documents or missing fields.
    #[error("invalid specification: {0}")]
    InvalidSpecification(ErrorInfo),
    /// The external program failed for a single combination.
    #[error("external invocation failed: {0}")]
    ExternalInvocationFailed(ErrorInfo),
    /// Filesystem errors raised while persisting sweep artefacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization errors raised while encoding reports or hashes.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SweepError {
    /// Shorthand for an [`SweepError::InvalidSpecification`] with a fresh payload.
    pub fn invalid(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::InvalidSpecification(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::SpecificationNotFound(info)
            | SweepError::InvalidSpecification(info)
            | SweepError::ExternalInvocationFailed(info)
            | SweepError::Io(info)
            | SweepError::Serde(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            SweepError::SpecificationNotFound(info)
            | SweepError::InvalidSpecification(info)
            | SweepError::ExternalInvocationFailed(info)
            | SweepError::Io(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the payload of an existing error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }

    /// Whether the error must stop the whole sweep.
    ///
    /// Only [`SweepError::ExternalInvocationFailed`] is local to a single
    /// combination; every other family aborts the driver.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SweepError::ExternalInvocationFailed(_))
    }
}
