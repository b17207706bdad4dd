//! Parameter value model: scalars, axes, specifications and combinations.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_yaml::Value as YamlValue;

use crate::errors::{ErrorInfo, SweepError};

/// A single parameter value forwarded verbatim to the external program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Free-form string value (map names, paths, cache modes).
    Str(String),
}

impl Scalar {
    /// Returns the string payload when the scalar is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload when the scalar is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload when the scalar is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Short lowercase name of the scalar kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Str(_) => "string",
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Value of a specification field: either held constant or swept over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Constant across every combination.
    Scalar(Scalar),
    /// Candidate values; each one appears in some combination.
    List(Vec<Scalar>),
}

impl ParamValue {
    /// Builds a list value from anything convertible into scalars.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Candidate values of the axis; scalars behave as a singleton list.
    pub fn values(&self) -> &[Scalar] {
        match self {
            ParamValue::Scalar(value) => std::slice::from_ref(value),
            ParamValue::List(values) => values,
        }
    }

    /// Returns `true` when the field was declared as a list.
    pub fn is_list(&self) -> bool {
        matches!(self, ParamValue::List(_))
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Scalar(value.into())
    }
}

/// Ordered mapping from parameter name to [`ParamValue`].
///
/// Every constructor validates the shape of each entry, so a value of this
/// type is never empty and never holds an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub struct ParameterSpec {
    entries: IndexMap<String, ParamValue>,
}

impl ParameterSpec {
    /// Builds a specification from ordered `(name, value)` pairs.
    pub fn try_from_entries<I, K>(entries: I) -> Result<Self, SweepError>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        let mut map = IndexMap::new();
        for (key, value) in entries {
            let key = key.into();
            if let ParamValue::List(values) = &value {
                if values.is_empty() {
                    return Err(SweepError::InvalidSpecification(
                        ErrorInfo::new("spec-empty-list", "list-valued parameter has no values")
                            .with_context("key", key),
                    ));
                }
            }
            if map.contains_key(&key) {
                return Err(SweepError::InvalidSpecification(
                    ErrorInfo::new("spec-duplicate-key", "parameter declared more than once")
                        .with_context("key", key),
                ));
            }
            map.insert(key, value);
        }
        if map.is_empty() {
            return Err(SweepError::invalid(
                "spec-empty",
                "specification declares no parameters",
            ));
        }
        Ok(Self { entries: map })
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, SweepError> {
        let value: YamlValue = serde_yaml::from_str(text).map_err(|err| {
            SweepError::InvalidSpecification(
                ErrorInfo::new("spec-parse", "failed to parse experiment document")
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_yaml_value(value)
    }

    /// Validates an already parsed YAML document.
    pub fn from_yaml_value(value: YamlValue) -> Result<Self, SweepError> {
        let mapping = match value {
            YamlValue::Mapping(mapping) => mapping,
            other => {
                return Err(SweepError::InvalidSpecification(
                    ErrorInfo::new("spec-not-mapping", "experiment document must be a mapping")
                        .with_context("found", yaml_kind(&other)),
                ))
            }
        };
        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                YamlValue::String(key) => key,
                other => {
                    return Err(SweepError::InvalidSpecification(
                        ErrorInfo::new("spec-key-type", "parameter names must be strings")
                            .with_context("found", yaml_kind(&other)),
                    ))
                }
            };
            let value = param_from_yaml(&key, value)?;
            entries.push((key, value));
        }
        Self::try_from_entries(entries)
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a validated specification.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a parameter by name.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Parameter names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// `(name, axis length)` pairs in declaration order.
    pub fn axes(&self) -> Vec<(&str, usize)> {
        self.iter()
            .map(|(key, value)| (key, value.values().len()))
            .collect()
    }

    /// Size of the full cartesian product.
    pub fn combination_count(&self) -> Result<usize, SweepError> {
        self.entries.iter().try_fold(1usize, |acc, (key, value)| {
            acc.checked_mul(value.values().len()).ok_or_else(|| {
                SweepError::InvalidSpecification(
                    ErrorInfo::new("spec-too-large", "number of combinations overflows usize")
                        .with_context("key", key.clone()),
                )
            })
        })
    }
}

impl TryFrom<YamlValue> for ParameterSpec {
    type Error = SweepError;

    fn try_from(value: YamlValue) -> Result<Self, Self::Error> {
        Self::from_yaml_value(value)
    }
}

impl Serialize for ParameterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

fn param_from_yaml(key: &str, value: YamlValue) -> Result<ParamValue, SweepError> {
    match value {
        YamlValue::Sequence(items) => items
            .into_iter()
            .map(|item| scalar_from_yaml(key, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List),
        other => scalar_from_yaml(key, other).map(ParamValue::Scalar),
    }
}

fn scalar_from_yaml(key: &str, value: YamlValue) -> Result<Scalar, SweepError> {
    match value {
        YamlValue::Bool(flag) => Ok(Scalar::Bool(flag)),
        YamlValue::String(text) => Ok(Scalar::Str(text)),
        YamlValue::Number(number) => number.as_i64().map(Scalar::Int).ok_or_else(|| {
            SweepError::InvalidSpecification(
                ErrorInfo::new("spec-unsupported-value", "numbers must be 64-bit integers")
                    .with_context("key", key)
                    .with_context("value", number.to_string()),
            )
        }),
        other => Err(SweepError::InvalidSpecification(
            ErrorInfo::new(
                "spec-unsupported-value",
                "values must be scalars or lists of scalars",
            )
            .with_context("key", key)
            .with_context("found", yaml_kind(&other)),
        )),
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged",
    }
}

/// One concrete assignment of a single scalar to every parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Combination {
    values: IndexMap<String, Scalar>,
}

impl Combination {
    /// Creates an empty combination with room for `capacity` parameters.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// Assigns `value` to `key`, keeping the first insertion position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.values.insert(key.into(), value.into());
    }

    /// Looks up the scalar assigned to `key`.
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key)
    }

    /// Parameter names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Assignments in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of assigned parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing has been assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Combination {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
