//! Type-tagged configuration entries consumed by factories.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhaseError};

/// A configuration entry naming an implementation type plus its parameters.
///
/// Phase, blending and interfacial model entries all share this shape:
///
/// ```yaml
/// type: constant
/// sigma: 0.07
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Registered implementation type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Remaining parameters, decoded by the implementation.
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

impl ModelSpec {
    /// Creates an entry with no parameters.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, converting it to a YAML value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Decodes the parameters into a typed structure.
    pub fn parse_params<P: DeserializeOwned>(&self) -> Result<P, PhaseError> {
        let mapping: serde_yaml::Mapping = self
            .params
            .iter()
            .map(|(key, value)| (serde_yaml::Value::from(key.as_str()), value.clone()))
            .collect();
        serde_yaml::from_value(serde_yaml::Value::Mapping(mapping)).map_err(|err| {
            PhaseError::Config(
                ErrorInfo::new("model-params", "failed to decode model parameters")
                    .with_context("type", self.type_name.clone())
                    .with_hint(err.to_string()),
            )
        })
    }

    /// Returns the nested entry stored under `key`, if any.
    pub fn sub_spec(&self, key: &str) -> Result<Option<ModelSpec>, PhaseError> {
        match self.params.get(key) {
            None => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone()).map(Some).map_err(|err| {
                PhaseError::Config(
                    ErrorInfo::new("model-sub-spec", "nested entry is not a typed model")
                        .with_context("type", self.type_name.clone())
                        .with_context("key", key)
                        .with_hint(err.to_string()),
                )
            }),
        }
    }
}
