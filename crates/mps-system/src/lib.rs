//! Multiphase system orchestration: phase construction and classification,
//! pair-indexed interfacial models, mixture aggregation and the per-step
//! correction sequence.

mod catalog;
mod config;
mod models;
mod phase;
mod serde;
mod sources;
mod system;

pub use catalog::Catalog;
pub use config::{load_config, ModelSection, PhaseSystemConfig};
pub use models::{
    AspectRatioModel, Blended, ConstantAspectRatio, ConstantSurfaceTension, SurfaceTensionModel,
    ASPECT_RATIO, SURFACE_TENSION,
};
pub use phase::{PhaseCtor, PhaseFactory, UniformPhase};
pub use crate::serde::stable_hash_string;
pub use sources::{MassSource, MassTransfer, MassTransferRates, UniformMassSource};
pub use system::{PhaseSystem, VSMALL};
