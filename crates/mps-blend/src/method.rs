use std::collections::BTreeMap;
use std::fmt;

use mps_core::{ErrorInfo, Phase, PhaseError, ScalarField};

/// Regime weights for one pair, each in `[0, 1]` and summing to one per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendingWeights {
    /// Weight of the regime where the first phase is dispersed in the second.
    pub first_in_second: ScalarField,
    /// Weight of the regime where the second phase is dispersed in the first.
    pub second_in_first: ScalarField,
    /// Weight of the segregated (fully mixed or fully separated) regime.
    pub segregated: ScalarField,
}

impl BlendingWeights {
    /// Combines per-phase continuity degrees into regime weights.
    ///
    /// With `c1`, `c2` the continuity of the first and second phase, the first
    /// phase is dispersed in proportion to `c2 (1 - c1)` and the second in
    /// proportion to `c1 (1 - c2)`; the segregated weight takes the rest.
    pub fn from_continuity(c1: &ScalarField, c2: &ScalarField) -> Self {
        debug_assert_eq!(c1.len(), c2.len());
        let len = c1.len();
        let mut first_in_second = Vec::with_capacity(len);
        let mut second_in_first = Vec::with_capacity(len);
        let mut segregated = Vec::with_capacity(len);
        for (a, b) in c1.values().iter().zip(c2.values()) {
            let f12 = b * (1.0 - a);
            let f21 = a * (1.0 - b);
            first_in_second.push(f12);
            second_in_first.push(f21);
            segregated.push((1.0 - f12 - f21).clamp(0.0, 1.0));
        }
        Self {
            first_in_second: ScalarField::new("f1In2", first_in_second),
            second_in_first: ScalarField::new("f2In1", second_in_first),
            segregated: ScalarField::new("fSegregated", segregated),
        }
    }
}

/// Stateless regime indicator configured once per blending category.
pub trait BlendingMethod: Send + Sync + fmt::Debug {
    /// Configured name of this method (the key in the `blending` table).
    fn name(&self) -> &str;

    /// Registered type name of the implementation.
    fn type_name(&self) -> &'static str;

    /// Degree in `[0, 1]` to which `phase` behaves as the continuous phase.
    fn continuity(&self, phase: &dyn Phase) -> Result<ScalarField, PhaseError>;

    /// Regime weights for the ordered pair `(first, second)`.
    fn weights(&self, first: &dyn Phase, second: &dyn Phase) -> Result<BlendingWeights, PhaseError> {
        let c1 = self.continuity(first)?;
        let c2 = self.continuity(second)?;
        Ok(BlendingWeights::from_continuity(&c1, &c2))
    }
}

/// Checks that a per-phase parameter table covers exactly the system phases.
pub(crate) fn validate_phase_table(
    method: &str,
    param: &str,
    table: &BTreeMap<String, f64>,
    phases: &[String],
) -> Result<(), PhaseError> {
    for name in table.keys() {
        if !phases.iter().any(|phase| phase == name) {
            return Err(PhaseError::UnknownPhase(
                ErrorInfo::new("blending-phase", format!("{param} names an unknown phase"))
                    .with_context("blending", method)
                    .with_context("phase", name.clone()),
            ));
        }
    }
    for phase in phases {
        phase_param(method, param, table, phase)?;
    }
    Ok(())
}

/// Looks up the per-phase parameter for `phase`.
pub(crate) fn phase_param(
    method: &str,
    param: &str,
    table: &BTreeMap<String, f64>,
    phase: &str,
) -> Result<f64, PhaseError> {
    table.get(phase).copied().ok_or_else(|| {
        PhaseError::Config(
            ErrorInfo::new("blending-missing-param", format!("no {param} entry for phase"))
                .with_context("blending", method)
                .with_context("phase", phase),
        )
    })
}
