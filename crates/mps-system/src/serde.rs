use std::collections::BTreeMap;

use mps_core::{ErrorInfo, PhaseError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

fn serde_error(code: &str, err: impl ToString) -> PhaseError {
    PhaseError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key, sort_keys(value)))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect(),
        Value::Array(values) => values.into_iter().map(sort_keys).collect(),
        other => other,
    }
}

/// SHA-256 fingerprint of `value` serialized as JSON with sorted keys.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, PhaseError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let bytes =
        serde_json::to_vec(&sort_keys(value)).map_err(|err| serde_error("json_write", err))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, PhaseError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
