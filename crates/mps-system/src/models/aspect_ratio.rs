use mps_core::{ErrorInfo, ModelSpec, PhaseError, ScalarField};
use mps_pair::{BuildContext, PairContext};
use serde::Deserialize;

use super::blended::Blended;

/// Aspect ratio of the dispersed-phase particles of a pair.
pub trait AspectRatioModel: Send + Sync {
    /// Aspect ratio over every cell; 1 denotes spherical particles.
    fn aspect_ratio(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError>;
}

/// Spatially constant aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantAspectRatio {
    e0: f64,
}

#[derive(Deserialize)]
struct ConstantParams {
    #[serde(rename = "E0")]
    e0: f64,
}

impl ConstantAspectRatio {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "constant";

    /// Aspect ratio `e0`, strictly positive.
    pub fn new(e0: f64) -> Result<Self, PhaseError> {
        if !e0.is_finite() || e0 <= 0.0 {
            return Err(PhaseError::Config(
                ErrorInfo::new("aspect-ratio-range", "aspect ratio must be finite and positive")
                    .with_context("E0", e0.to_string()),
            ));
        }
        Ok(Self { e0 })
    }

    /// Factory constructor.
    pub fn from_spec(
        spec: &ModelSpec,
        _ctx: &BuildContext<'_, dyn AspectRatioModel>,
    ) -> Result<Box<dyn AspectRatioModel>, PhaseError> {
        let params: ConstantParams = spec.parse_params()?;
        Ok(Box::new(Self::new(params.e0)?))
    }
}

impl AspectRatioModel for ConstantAspectRatio {
    fn aspect_ratio(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError> {
        Ok(ScalarField::uniform(
            format!("E.{}", ctx.pair.name()),
            ctx.n_cells(),
            self.e0,
        ))
    }
}

impl Blended<dyn AspectRatioModel> {
    /// Factory constructor for `type: blended` aspect ratio entries.
    pub fn aspect_ratio(
        spec: &ModelSpec,
        ctx: &BuildContext<'_, dyn AspectRatioModel>,
    ) -> Result<Box<dyn AspectRatioModel>, PhaseError> {
        Ok(Box::new(Self::from_spec(spec, ctx)?))
    }
}

impl AspectRatioModel for Blended<dyn AspectRatioModel> {
    fn aspect_ratio(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError> {
        let name = format!("E.{}", ctx.pair.name());
        Ok(self.blend(ctx, |model| model.aspect_ratio(ctx))?.with_name(name))
    }
}
