use std::sync::Arc;

use indexmap::IndexMap;
use mps_core::{ErrorInfo, PhaseError};
use tracing::debug;

use crate::key::PairKey;
use crate::pair::{Pair, PhaseRef};

/// Lazily populated map from [`PairKey`] to the single [`Pair`] for that key.
///
/// Mutated only while a system is being constructed; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    phases: Vec<String>,
    pairs: IndexMap<PairKey, Arc<Pair>>,
}

impl PairRegistry {
    /// Registry over the given ordered phase names.
    pub fn new<I, S>(phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
            pairs: IndexMap::new(),
        }
    }

    /// Phase names known to the registry, in system order.
    pub fn phase_names(&self) -> &[String] {
        &self.phases
    }

    /// Resolves a phase name to its system index.
    pub fn phase_ref(&self, name: &str) -> Result<PhaseRef, PhaseError> {
        self.phases
            .iter()
            .position(|phase| phase == name)
            .map(|index| PhaseRef {
                name: name.to_string(),
                index,
            })
            .ok_or_else(|| PhaseError::unknown_phase(name))
    }

    /// Builds a pair for `key` without registering it.
    pub fn resolve(&self, key: &PairKey) -> Result<Pair, PhaseError> {
        let first = self
            .phase_ref(key.first())
            .map_err(|err| err.with_context("pair", key.to_string()))?;
        let second = self
            .phase_ref(key.second())
            .map_err(|err| err.with_context("pair", key.to_string()))?;
        Ok(Pair::new(key.clone(), first, second))
    }

    /// Registers a pair for `key` unless one already exists.
    ///
    /// Repeated calls with the same (or, for unordered keys, the reversed)
    /// key leave the original instance in place.
    pub fn ensure(&mut self, key: &PairKey) -> Result<(), PhaseError> {
        if self.pairs.contains_key(key) {
            return Ok(());
        }
        let pair = self.resolve(key)?;
        debug!(pair = %pair.name(), ordered = key.is_ordered(), "registered phase pair");
        self.pairs.insert(key.clone(), Arc::new(pair));
        Ok(())
    }

    /// Looks up the pair registered for `key`.
    pub fn get(&self, key: &PairKey) -> Option<&Arc<Pair>> {
        self.pairs.get(key)
    }

    /// Looks up the pair registered for `key`, failing when absent.
    pub fn pair(&self, key: &PairKey) -> Result<&Arc<Pair>, PhaseError> {
        self.get(key).ok_or_else(|| {
            PhaseError::Config(
                ErrorInfo::new("pair-unregistered", "no pair registered for key")
                    .with_context("pair", key.to_string()),
            )
        })
    }

    /// Registered pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Pair>> {
        self.pairs.values()
    }

    /// Number of registered pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no pair has been registered.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
