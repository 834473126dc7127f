use mps_core::{ErrorInfo, ModelSpec, PhaseError, ScalarField};
use mps_pair::{BuildContext, PairContext};
use serde::Deserialize;

use super::blended::Blended;

/// Interfacial tension between the two phases of a pair.
pub trait SurfaceTensionModel: Send + Sync {
    /// Surface tension coefficient over every cell.
    fn sigma(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError>;

    /// Surface tension coefficient on the faces of boundary patch `patch`.
    fn sigma_patch(&self, ctx: &PairContext<'_>, patch: usize) -> Result<Vec<f64>, PhaseError> {
        let sigma = self.sigma(ctx)?;
        ctx.mesh.patch_values(&sigma, patch)
    }
}

/// Spatially constant surface tension.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSurfaceTension {
    sigma: f64,
}

#[derive(Deserialize)]
struct ConstantParams {
    sigma: f64,
}

impl ConstantSurfaceTension {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "constant";

    /// Coefficient in N/m.
    pub fn new(sigma: f64) -> Result<Self, PhaseError> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(PhaseError::Config(
                ErrorInfo::new("sigma-negative", "surface tension must be finite and non-negative")
                    .with_context("sigma", sigma.to_string()),
            ));
        }
        Ok(Self { sigma })
    }

    /// Factory constructor.
    pub fn from_spec(
        spec: &ModelSpec,
        _ctx: &BuildContext<'_, dyn SurfaceTensionModel>,
    ) -> Result<Box<dyn SurfaceTensionModel>, PhaseError> {
        let params: ConstantParams = spec.parse_params()?;
        Ok(Box::new(Self::new(params.sigma)?))
    }
}

impl SurfaceTensionModel for ConstantSurfaceTension {
    fn sigma(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError> {
        Ok(ScalarField::uniform(
            format!("sigma.{}", ctx.pair.name()),
            ctx.n_cells(),
            self.sigma,
        ))
    }

    fn sigma_patch(&self, ctx: &PairContext<'_>, patch: usize) -> Result<Vec<f64>, PhaseError> {
        Ok(vec![self.sigma; ctx.mesh.patch(patch)?.len()])
    }
}

impl Blended<dyn SurfaceTensionModel> {
    /// Factory constructor for `type: blended` surface tension entries.
    pub fn surface_tension(
        spec: &ModelSpec,
        ctx: &BuildContext<'_, dyn SurfaceTensionModel>,
    ) -> Result<Box<dyn SurfaceTensionModel>, PhaseError> {
        Ok(Box::new(Self::from_spec(spec, ctx)?))
    }
}

impl SurfaceTensionModel for Blended<dyn SurfaceTensionModel> {
    fn sigma(&self, ctx: &PairContext<'_>) -> Result<ScalarField, PhaseError> {
        let name = format!("sigma.{}", ctx.pair.name());
        Ok(self.blend(ctx, |model| model.sigma(ctx))?.with_name(name))
    }
}
