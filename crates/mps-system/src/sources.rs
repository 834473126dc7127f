//! Injected volumetric mass sources and the inter-phase mass transfer protocol.

use mps_core::{PhaseError, ScalarField};
use mps_pair::PairContext;

/// Externally injected volumetric source acting on a phase density field.
pub trait MassSource: Send + Sync {
    /// Source name, used in diagnostics.
    fn name(&self) -> &str;

    /// Whether the source acts on the field called `field`.
    fn applies_to(&self, field: &str) -> bool;

    /// Explicit mass source for a phase with the given fraction and density.
    fn explicit(&self, alpha: &ScalarField, rho: &ScalarField) -> Result<ScalarField, PhaseError>;
}

/// Source injecting `rate` kg/m³/s scaled by the phase fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMassSource {
    name: String,
    field: String,
    rate: f64,
}

impl UniformMassSource {
    /// Source acting on the density field `field`.
    pub fn new(name: impl Into<String>, field: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            rate,
        }
    }
}

impl MassSource for UniformMassSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to(&self, field: &str) -> bool {
        self.field == field
    }

    fn explicit(&self, alpha: &ScalarField, _rho: &ScalarField) -> Result<ScalarField, PhaseError> {
        Ok(alpha.scaled(self.rate).with_name(self.name.clone()))
    }
}

/// Index-addressed per-phase mass transfer rates.
///
/// Slots without a contribution stay empty; adding to a slot accumulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassTransferRates {
    slots: Vec<Option<ScalarField>>,
}

impl MassTransferRates {
    /// Empty slots for `n_phases` phases.
    pub fn new(n_phases: usize) -> Self {
        Self {
            slots: vec![None; n_phases],
        }
    }

    /// Adds `rate` to the slot of phase `index`.
    pub fn add(&mut self, index: usize, rate: &ScalarField) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        if let Some(existing) = self.slots[index].as_mut() {
            *existing += rate;
        } else {
            self.slots[index] = Some(rate.clone());
        }
    }

    /// Rate attributed to phase `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ScalarField> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Interfacial mass transfer layered on top of the system.
pub trait MassTransfer: Send + Sync {
    /// Mass transfer rate from the second phase of the pair into the first.
    fn dmdtf(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError>;
}
