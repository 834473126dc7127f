#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the multiphase system crates: errors, fields, mesh, time and the phase capability."]

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod errors;
pub mod field;
pub mod mesh;
pub mod time;

pub use config::ModelSpec;
pub use errors::{ErrorInfo, PhaseError};
pub use field::{ScalarField, SurfaceScalarField, VectorField};
pub use mesh::{Face, Mesh, Patch};
pub use time::Time;

/// Classification flags reported by a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFlags {
    /// Phase does not move (e.g. a packed bed).
    #[serde(default)]
    pub stationary: bool,
    /// Phase carries no energy equation.
    #[serde(default = "default_true")]
    pub isothermal: bool,
    /// Phase has a single component.
    #[serde(default = "default_true")]
    pub pure: bool,
    /// Phase density does not depend on pressure.
    #[serde(default = "default_true")]
    pub incompressible: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PhaseFlags {
    fn default() -> Self {
        Self {
            stationary: false,
            isothermal: true,
            pure: true,
            incompressible: true,
        }
    }
}

/// Lifecycle hooks driven by the phase system, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    /// General correction.
    Correct,
    /// Kinematic (flux/velocity) correction.
    CorrectKinematics,
    /// Thermodynamic correction.
    CorrectThermo,
    /// Reaction rate correction.
    CorrectReactions,
    /// Species transport correction.
    CorrectSpecies,
    /// Turbulence model correction.
    CorrectTurbulence,
    /// Energy transport correction.
    CorrectEnergyTransport,
    /// Continuity error correction.
    CorrectContinuityError,
    /// Configuration re-read.
    Read,
}

impl Hook {
    /// Stable name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Correct => "correct",
            Hook::CorrectKinematics => "correctKinematics",
            Hook::CorrectThermo => "correctThermo",
            Hook::CorrectReactions => "correctReactions",
            Hook::CorrectSpecies => "correctSpecies",
            Hook::CorrectTurbulence => "correctTurbulence",
            Hook::CorrectEnergyTransport => "correctEnergyTransport",
            Hook::CorrectContinuityError => "correctContinuityError",
            Hook::Read => "read",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability contract for a single phase owned by a phase system.
///
/// Field accessors must return fields sized to the system mesh (cells for
/// volume fields, faces for `phi`). Lifecycle hooks default to no-ops.
pub trait Phase: Send + Sync {
    /// Phase name, unique within a system.
    fn name(&self) -> &str;

    /// Ordinal position in the system phase list.
    fn index(&self) -> usize;

    /// Volume fraction in `[0, 1]`.
    fn alpha(&self) -> &ScalarField;

    /// Density.
    fn rho(&self) -> &ScalarField;

    /// Velocity.
    fn velocity(&self) -> &VectorField;

    /// Volumetric face flux.
    fn phi(&self) -> &SurfaceScalarField;

    /// Pressure seen by the phase.
    fn pressure(&self) -> &ScalarField;

    /// Pressure at the previous time level.
    fn pressure_old(&self) -> &ScalarField;

    /// Classification flags.
    fn flags(&self) -> PhaseFlags;

    /// Convenience accessor for [`PhaseFlags::stationary`].
    fn stationary(&self) -> bool {
        self.flags().stationary
    }

    /// Convenience accessor for [`PhaseFlags::isothermal`].
    fn isothermal(&self) -> bool {
        self.flags().isothermal
    }

    /// Convenience accessor for [`PhaseFlags::pure`].
    fn pure(&self) -> bool {
        self.flags().pure
    }

    /// Convenience accessor for [`PhaseFlags::incompressible`].
    fn incompressible(&self) -> bool {
        self.flags().incompressible
    }

    /// Whether the thermodynamics of this phase needs the pressure time derivative.
    fn requests_dpdt(&self) -> bool {
        false
    }

    /// General per-step correction.
    fn correct(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Kinematic correction.
    fn correct_kinematics(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Thermodynamic correction.
    fn correct_thermo(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Reaction correction.
    fn correct_reactions(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Species correction.
    fn correct_species(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Turbulence correction.
    fn correct_turbulence(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Energy transport correction.
    fn correct_energy_transport(&mut self) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Applies the combined mass source to the phase continuity error.
    fn correct_continuity_error(&mut self, _source: &ScalarField) -> Result<(), PhaseError> {
        Ok(())
    }

    /// Re-reads the phase configuration, returning whether it was accepted.
    fn read(&mut self, _spec: &ModelSpec) -> Result<bool, PhaseError> {
        Ok(true)
    }
}
