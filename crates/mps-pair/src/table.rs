use std::fmt;

use indexmap::IndexMap;
use mps_core::{ErrorInfo, PhaseError};

use crate::key::PairKey;

/// Pair-indexed table of owned models of one physical effect.
///
/// A key maps to at most one model; lookups for unconfigured keys return
/// `None` rather than a synthesised default.
pub struct SubModelTable<T: ?Sized> {
    effect: String,
    models: IndexMap<PairKey, Box<T>>,
}

impl<T: ?Sized> SubModelTable<T> {
    /// Empty table for the named effect (e.g. `surfaceTension`).
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            models: IndexMap::new(),
        }
    }

    /// Effect name.
    pub fn effect(&self) -> &str {
        &self.effect
    }

    /// Inserts `model` under `key`, failing if the key is already populated.
    pub fn insert(&mut self, key: PairKey, model: Box<T>) -> Result<(), PhaseError> {
        if let Some((existing, _)) = self.models.get_key_value(&key) {
            return Err(PhaseError::DuplicateModel(
                ErrorInfo::new("duplicate-model", "pair already carries a model for this effect")
                    .with_context("effect", self.effect.clone())
                    .with_context("pair", key.to_string())
                    .with_context("existing", existing.to_string())
                    .with_hint("combine competing correlations with a blended model"),
            ));
        }
        self.models.insert(key, model);
        Ok(())
    }

    /// Model registered for `key`, if any.
    pub fn get(&self, key: &PairKey) -> Option<&T> {
        self.models.get(key).map(|model| &**model)
    }

    /// True when `key` carries a model.
    pub fn contains(&self, key: &PairKey) -> bool {
        self.models.contains_key(key)
    }

    /// Entries in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &T)> {
        self.models.iter().map(|(key, model)| (key, &**model))
    }

    /// Populated keys in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.models.keys()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when the table holds no model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for SubModelTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubModelTable")
            .field("effect", &self.effect)
            .field("keys", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}
