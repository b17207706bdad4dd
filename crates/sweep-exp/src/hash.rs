use serde::Serialize;
use sha2::{Digest, Sha256};
use sweep_core::errors::{ErrorInfo, SweepError};
use sweep_core::{ParamValue, ParameterSpec};

/// Computes a stable hexadecimal hash over the JSON encoding of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SweepError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|err| SweepError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}

/// Hashes a specification including its declaration order.
///
/// Entries are hashed as an ordered list of `[name, value]` pairs, so
/// reordering keys (which reorders the combinations) changes the hash.
pub fn spec_hash(spec: &ParameterSpec) -> Result<String, SweepError> {
    let entries: Vec<(&str, &ParamValue)> = spec.iter().collect();
    stable_hash_string(&entries)
}
