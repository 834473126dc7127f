//! Per-effect interfacial models and their built-in implementations.

mod aspect_ratio;
mod blended;
mod surface_tension;

pub use aspect_ratio::{AspectRatioModel, ConstantAspectRatio};
pub use blended::Blended;
pub use surface_tension::{ConstantSurfaceTension, SurfaceTensionModel};

/// Effect name of the surface tension table.
pub const SURFACE_TENSION: &str = "surfaceTension";
/// Effect name of the aspect ratio table.
pub const ASPECT_RATIO: &str = "aspectRatio";
