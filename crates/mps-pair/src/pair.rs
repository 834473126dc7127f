use mps_core::{Mesh, Phase};
use serde::{Deserialize, Serialize};

use crate::key::PairKey;

/// Name and ordinal of a phase referenced by a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRef {
    /// Phase name.
    pub name: String,
    /// Index into the owning system's phase list.
    pub index: usize,
}

/// Two phases that interact through one or more interfacial models.
///
/// Pairs refer to their phases by index; the phases themselves stay owned by
/// the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    key: PairKey,
    first: PhaseRef,
    second: PhaseRef,
}

impl Pair {
    pub(crate) fn new(key: PairKey, first: PhaseRef, second: PhaseRef) -> Self {
        Self { key, first, second }
    }

    /// Key under which the pair is registered.
    pub fn key(&self) -> &PairKey {
        &self.key
    }

    /// First phase (the dispersed phase of an ordered pair).
    pub fn first(&self) -> &PhaseRef {
        &self.first
    }

    /// Second phase (the continuous phase of an ordered pair).
    pub fn second(&self) -> &PhaseRef {
        &self.second
    }

    /// Whether the pair is directional.
    pub fn is_ordered(&self) -> bool {
        self.key.is_ordered()
    }

    /// Dispersed phase, only defined for ordered pairs.
    pub fn dispersed(&self) -> Option<&PhaseRef> {
        self.is_ordered().then_some(&self.first)
    }

    /// Continuous phase, only defined for ordered pairs.
    pub fn continuous(&self) -> Option<&PhaseRef> {
        self.is_ordered().then_some(&self.second)
    }

    /// Display name, e.g. `airAndWater` or `airInWater`.
    pub fn name(&self) -> String {
        let joiner = if self.is_ordered() { "In" } else { "And" };
        format!("{}{}{}", self.first.name, joiner, capitalise(&self.second.name))
    }
}

fn capitalise(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Borrowed view of a pair together with its live phases, handed to models.
#[derive(Clone, Copy)]
pub struct PairContext<'a> {
    /// The pair being evaluated.
    pub pair: &'a Pair,
    /// Live first phase.
    pub first: &'a dyn Phase,
    /// Live second phase.
    pub second: &'a dyn Phase,
    /// Mesh shared by every field.
    pub mesh: &'a Mesh,
}

impl<'a> PairContext<'a> {
    /// Number of cells in the domain.
    pub fn n_cells(&self) -> usize {
        self.mesh.n_cells()
    }

    /// Dispersed phase of an ordered pair.
    pub fn dispersed(&self) -> Option<&'a dyn Phase> {
        self.pair.is_ordered().then_some(self.first)
    }

    /// Continuous phase of an ordered pair.
    pub fn continuous(&self) -> Option<&'a dyn Phase> {
        self.pair.is_ordered().then_some(self.second)
    }
}
