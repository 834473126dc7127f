#![deny(missing_docs)]
#![doc = "Flow-regime blending methods producing interpolation weights between dispersed and segregated interfacial correlations."]

/// Built-in methods: `none`, `linear` and `hyperbolic`.
pub mod builtin;
/// Type-name registry and the constructed method table.
pub mod factory;
/// The blending capability and regime weights.
pub mod method;

pub use builtin::{Hyperbolic, Linear, NoBlending};
pub use factory::{BlendingCtor, BlendingFactory, BlendingMethods};
pub use method::{BlendingMethod, BlendingWeights};
