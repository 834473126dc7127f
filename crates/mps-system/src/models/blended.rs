use std::fmt;
use std::sync::Arc;

use mps_blend::BlendingMethod;
use mps_core::{ErrorInfo, ModelSpec, PhaseError, ScalarField};
use mps_pair::{BuildContext, PairContext};
use serde::Deserialize;

#[derive(Deserialize)]
struct BlendedParams {
    method: String,
}

/// Composite holding up to three regime-specific models of one kind for a
/// single pair, combined with the weights of a named blending method.
///
/// ```yaml
/// air and water:
///   type: blended
///   method: default
///   firstInSecond: { type: constant, sigma: 0.07 }
///   segregated: { type: constant, sigma: 0.05 }
/// ```
pub struct Blended<T: ?Sized> {
    method: Arc<dyn BlendingMethod>,
    first_in_second: Option<Box<T>>,
    second_in_first: Option<Box<T>>,
    segregated: Option<Box<T>>,
}

impl<T: ?Sized> Blended<T> {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "blended";

    /// Builds the composite, constructing nested models through the same factory.
    pub fn from_spec(spec: &ModelSpec, ctx: &BuildContext<'_, T>) -> Result<Self, PhaseError> {
        let params: BlendedParams = spec.parse_params()?;
        let method = ctx
            .blending
            .get(&params.method)
            .map_err(|err| err.with_context("effect", ctx.effect))?;
        let build = |key: &str| -> Result<Option<Box<T>>, PhaseError> {
            match spec.sub_spec(key)? {
                Some(sub) => ctx.build(&sub).map(Some),
                None => Ok(None),
            }
        };
        let blended = Self {
            method,
            first_in_second: build("firstInSecond")?,
            second_in_first: build("secondInFirst")?,
            segregated: build("segregated")?,
        };
        if blended.first_in_second.is_none()
            && blended.second_in_first.is_none()
            && blended.segregated.is_none()
        {
            return Err(PhaseError::Config(
                ErrorInfo::new("blended-empty", "blended model declares no sub-model")
                    .with_context("effect", ctx.effect)
                    .with_context("pair", ctx.pair.key().to_string())
                    .with_hint("set at least one of firstInSecond, secondInFirst, segregated"),
            ));
        }
        Ok(blended)
    }

    /// Blending method shared with the rest of the system.
    pub fn method(&self) -> &Arc<dyn BlendingMethod> {
        &self.method
    }

    /// Weighted sum of the configured sub-models; absent ones contribute nothing.
    pub fn blend<F>(&self, ctx: &PairContext<'_>, mut eval: F) -> Result<ScalarField, PhaseError>
    where
        F: FnMut(&T) -> Result<ScalarField, PhaseError>,
    {
        let weights = self.method.weights(ctx.first, ctx.second)?;
        let mut total = ScalarField::zeros("blended", ctx.n_cells());
        let parts = [
            (&self.first_in_second, &weights.first_in_second),
            (&self.second_in_first, &weights.second_in_first),
            (&self.segregated, &weights.segregated),
        ];
        for (model, weight) in parts {
            if let Some(model) = model {
                let value = eval(&**model)?;
                value.check_len(ctx.n_cells())?;
                total += &(weight * &value);
            }
        }
        Ok(total)
    }
}

impl<T: ?Sized> fmt::Debug for Blended<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blended")
            .field("method", &self.method.name())
            .field("first_in_second", &self.first_in_second.is_some())
            .field("second_in_first", &self.second_in_first.is_some())
            .field("segregated", &self.segregated.is_some())
            .finish()
    }
}
