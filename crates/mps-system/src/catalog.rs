use mps_blend::BlendingFactory;
use mps_pair::ModelFactory;

use crate::models::{
    AspectRatioModel, Blended, ConstantAspectRatio, ConstantSurfaceTension, SurfaceTensionModel,
    ASPECT_RATIO, SURFACE_TENSION,
};
use crate::phase::PhaseFactory;

/// Every name-keyed constructor registry consulted while building a system.
///
/// Register custom phase, blending or model types here before constructing
/// a [`crate::PhaseSystem`]; the catalog is only read during construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Phase types.
    pub phases: PhaseFactory,
    /// Blending method types.
    pub blending: BlendingFactory,
    /// Surface tension model types.
    pub surface_tension: ModelFactory<dyn SurfaceTensionModel>,
    /// Aspect ratio model types.
    pub aspect_ratio: ModelFactory<dyn AspectRatioModel>,
}

impl Catalog {
    /// Catalog with no registered types.
    pub fn empty() -> Self {
        Self {
            phases: PhaseFactory::new(),
            blending: BlendingFactory::new(),
            surface_tension: ModelFactory::new(SURFACE_TENSION),
            aspect_ratio: ModelFactory::new(ASPECT_RATIO),
        }
    }

    /// Catalog holding the built-in phase, blending and model types.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::empty();
        catalog.phases = PhaseFactory::with_builtins();
        catalog.blending = BlendingFactory::with_builtins();
        catalog
            .surface_tension
            .register(ConstantSurfaceTension::TYPE_NAME, ConstantSurfaceTension::from_spec)
            .register(
                Blended::<dyn SurfaceTensionModel>::TYPE_NAME,
                Blended::<dyn SurfaceTensionModel>::surface_tension,
            );
        catalog
            .aspect_ratio
            .register(ConstantAspectRatio::TYPE_NAME, ConstantAspectRatio::from_spec)
            .register(
                Blended::<dyn AspectRatioModel>::TYPE_NAME,
                Blended::<dyn AspectRatioModel>::aspect_ratio,
            );
        catalog
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}
