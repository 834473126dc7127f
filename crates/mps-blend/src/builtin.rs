use std::collections::BTreeMap;

use mps_core::{ErrorInfo, ModelSpec, Phase, PhaseError, ScalarField};
use serde::Deserialize;

use crate::method::{phase_param, validate_phase_table, BlendingMethod};

/// Hard switch: the named phase is always continuous, every other phase dispersed.
#[derive(Debug, Clone)]
pub struct NoBlending {
    name: String,
    continuous_phase: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoBlendingParams {
    continuous_phase: String,
}

impl NoBlending {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "none";

    /// Builds the method from its configuration entry.
    pub fn from_spec(
        name: &str,
        spec: &ModelSpec,
        phases: &[String],
    ) -> Result<Box<dyn BlendingMethod>, PhaseError> {
        let params: NoBlendingParams = spec.parse_params()?;
        if !phases.contains(&params.continuous_phase) {
            return Err(PhaseError::UnknownPhase(
                ErrorInfo::new("blending-phase", "continuousPhase names an unknown phase")
                    .with_context("blending", name)
                    .with_context("phase", params.continuous_phase),
            ));
        }
        Ok(Box::new(Self {
            name: name.to_string(),
            continuous_phase: params.continuous_phase,
        }))
    }
}

impl BlendingMethod for NoBlending {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn continuity(&self, phase: &dyn Phase) -> Result<ScalarField, PhaseError> {
        let value = if phase.name() == self.continuous_phase {
            1.0
        } else {
            0.0
        };
        Ok(ScalarField::uniform(
            format!("continuity.{}", phase.name()),
            phase.alpha().len(),
            value,
        ))
    }
}

/// Linear ramp between a partly and a fully continuous volume fraction.
#[derive(Debug, Clone)]
pub struct Linear {
    name: String,
    min_fully_continuous_alpha: BTreeMap<String, f64>,
    min_partly_continuous_alpha: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinearParams {
    min_fully_continuous_alpha: BTreeMap<String, f64>,
    min_partly_continuous_alpha: BTreeMap<String, f64>,
}

impl Linear {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "linear";

    /// Builds the method from its configuration entry.
    pub fn from_spec(
        name: &str,
        spec: &ModelSpec,
        phases: &[String],
    ) -> Result<Box<dyn BlendingMethod>, PhaseError> {
        let params: LinearParams = spec.parse_params()?;
        validate_phase_table(
            name,
            "minFullyContinuousAlpha",
            &params.min_fully_continuous_alpha,
            phases,
        )?;
        validate_phase_table(
            name,
            "minPartlyContinuousAlpha",
            &params.min_partly_continuous_alpha,
            phases,
        )?;
        for (phase, fully) in &params.min_fully_continuous_alpha {
            if let Some(partly) = params.min_partly_continuous_alpha.get(phase) {
                if partly >= fully {
                    return Err(PhaseError::Config(
                        ErrorInfo::new(
                            "blending-linear-range",
                            "minPartlyContinuousAlpha must be below minFullyContinuousAlpha",
                        )
                        .with_context("blending", name)
                        .with_context("phase", phase.clone()),
                    ));
                }
            }
        }
        Ok(Box::new(Self {
            name: name.to_string(),
            min_fully_continuous_alpha: params.min_fully_continuous_alpha,
            min_partly_continuous_alpha: params.min_partly_continuous_alpha,
        }))
    }
}

impl BlendingMethod for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn continuity(&self, phase: &dyn Phase) -> Result<ScalarField, PhaseError> {
        let fully = phase_param(
            &self.name,
            "minFullyContinuousAlpha",
            &self.min_fully_continuous_alpha,
            phase.name(),
        )?;
        let partly = phase_param(
            &self.name,
            "minPartlyContinuousAlpha",
            &self.min_partly_continuous_alpha,
            phase.name(),
        )?;
        let span = fully - partly;
        Ok(phase
            .alpha()
            .map(|alpha| ((alpha - partly) / span).clamp(0.0, 1.0))
            .with_name(format!("continuity.{}", phase.name())))
    }
}

/// Smooth `tanh` transition centred on a minimum continuous volume fraction.
#[derive(Debug, Clone)]
pub struct Hyperbolic {
    name: String,
    min_continuous_alpha: BTreeMap<String, f64>,
    transition_alpha_scale: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HyperbolicParams {
    min_continuous_alpha: BTreeMap<String, f64>,
    transition_alpha_scale: f64,
}

impl Hyperbolic {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "hyperbolic";

    /// Builds the method from its configuration entry.
    pub fn from_spec(
        name: &str,
        spec: &ModelSpec,
        phases: &[String],
    ) -> Result<Box<dyn BlendingMethod>, PhaseError> {
        let params: HyperbolicParams = spec.parse_params()?;
        validate_phase_table(name, "minContinuousAlpha", &params.min_continuous_alpha, phases)?;
        if !params.transition_alpha_scale.is_finite() || params.transition_alpha_scale <= 0.0 {
            return Err(PhaseError::Config(
                ErrorInfo::new(
                    "blending-hyperbolic-scale",
                    "transitionAlphaScale must be positive and finite",
                )
                .with_context("blending", name),
            ));
        }
        Ok(Box::new(Self {
            name: name.to_string(),
            min_continuous_alpha: params.min_continuous_alpha,
            transition_alpha_scale: params.transition_alpha_scale,
        }))
    }
}

impl BlendingMethod for Hyperbolic {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn continuity(&self, phase: &dyn Phase) -> Result<ScalarField, PhaseError> {
        let min = phase_param(
            &self.name,
            "minContinuousAlpha",
            &self.min_continuous_alpha,
            phase.name(),
        )?;
        let slope = 4.0 / self.transition_alpha_scale;
        Ok(phase
            .alpha()
            .map(|alpha| 0.5 * (1.0 + (slope * (alpha - min)).tanh()))
            .with_name(format!("continuity.{}", phase.name())))
    }
}
