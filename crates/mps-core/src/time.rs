//! Time-step bookkeeping and time-derivative helpers.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhaseError};
use crate::field::{ScalarField, SurfaceScalarField};

/// Current simulation time and step size supplied by the host loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Time {
    /// Current time value.
    pub value: f64,
    /// Global time-step size.
    pub delta_t: f64,
    /// Per-cell reciprocal time step when local time stepping is enabled.
    #[serde(default)]
    pub local_rdelta_t: Option<ScalarField>,
    /// Per-face reciprocal time step when local time stepping is enabled.
    #[serde(default)]
    pub local_rdelta_tf: Option<SurfaceScalarField>,
}

impl Time {
    /// Global time stepping at `value` with step `delta_t`.
    pub fn new(value: f64, delta_t: f64) -> Result<Self, PhaseError> {
        if !delta_t.is_finite() || delta_t <= 0.0 {
            return Err(PhaseError::Config(
                ErrorInfo::new("invalid-delta-t", "time step must be positive and finite")
                    .with_context("delta_t", delta_t.to_string()),
            ));
        }
        Ok(Self {
            value,
            delta_t,
            local_rdelta_t: None,
            local_rdelta_tf: None,
        })
    }

    /// Enables local time stepping with the given reciprocal step fields.
    pub fn with_local_rdelta_t(mut self, cells: ScalarField, faces: SurfaceScalarField) -> Self {
        self.local_rdelta_t = Some(cells);
        self.local_rdelta_tf = Some(faces);
        self
    }

    /// True when local time stepping is active.
    pub fn local_time_stepping(&self) -> bool {
        self.local_rdelta_t.is_some()
    }

    /// Divides a cell field by the (local or global) time step.
    pub fn by_dt(&self, field: &ScalarField) -> ScalarField {
        match &self.local_rdelta_t {
            Some(rdt) => (rdt * field).with_name(field.name().to_string()),
            None => field.scaled(1.0 / self.delta_t),
        }
    }

    /// Divides a face field by the (local or global) time step.
    pub fn by_dt_faces(&self, field: &SurfaceScalarField) -> SurfaceScalarField {
        match &self.local_rdelta_tf {
            Some(rdt) => (rdt * field).with_name(field.name().to_string()),
            None => {
                let rdt = 1.0 / self.delta_t;
                field.map(|v| v * rdt)
            }
        }
    }

    /// First-order Euler time derivative of `current` relative to `old`.
    pub fn ddt(&self, current: &ScalarField, old: &ScalarField) -> ScalarField {
        self.by_dt(&(current - old))
            .with_name(format!("ddt({})", current.name()))
    }
}
