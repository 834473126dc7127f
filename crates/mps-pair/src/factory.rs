use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mps_blend::BlendingMethods;
use mps_core::{ErrorInfo, ModelSpec, PhaseError};

use crate::pair::Pair;

/// Everything a model constructor may consult while being built.
pub struct BuildContext<'a, T: ?Sized> {
    /// Effect being populated, e.g. `aspectRatio`.
    pub effect: &'a str,
    /// Pair the model is attached to.
    pub pair: &'a Arc<Pair>,
    /// Blending methods configured for the system.
    pub blending: &'a BlendingMethods,
    /// Factory for nested models of the same kind.
    pub factory: &'a ModelFactory<T>,
}

impl<'a, T: ?Sized> BuildContext<'a, T> {
    /// Builds a nested model of the same kind for the same pair.
    pub fn build(&self, spec: &ModelSpec) -> Result<Box<T>, PhaseError> {
        self.factory.create(spec, self)
    }
}

/// Constructor registered under a model type name.
pub type ModelCtor<T> = fn(&ModelSpec, &BuildContext<'_, T>) -> Result<Box<T>, PhaseError>;

/// Type-name keyed constructors for one model kind.
///
/// Populate before reading any configuration; it is only read afterwards.
pub struct ModelFactory<T: ?Sized> {
    effect: String,
    ctors: BTreeMap<String, ModelCtor<T>>,
}

impl<T: ?Sized> ModelFactory<T> {
    /// Empty factory for the named effect.
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            ctors: BTreeMap::new(),
        }
    }

    /// Effect name.
    pub fn effect(&self) -> &str {
        &self.effect
    }

    /// Registers (or replaces) a constructor under `type_name`.
    pub fn register(&mut self, type_name: impl Into<String>, ctor: ModelCtor<T>) -> &mut Self {
        self.ctors.insert(type_name.into(), ctor);
        self
    }

    /// Registered type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.ctors.keys().map(String::as_str)
    }

    /// Instantiates the model described by `spec`.
    pub fn create(&self, spec: &ModelSpec, ctx: &BuildContext<'_, T>) -> Result<Box<T>, PhaseError> {
        let ctor = self.ctors.get(&spec.type_name).ok_or_else(|| {
            PhaseError::UnknownModelType(
                ErrorInfo::new("model-type", "unknown model type")
                    .with_context("effect", self.effect.clone())
                    .with_context("type", spec.type_name.clone())
                    .with_context("pair", ctx.pair.key().to_string())
                    .with_hint(format!(
                        "valid types: {}",
                        self.type_names().collect::<Vec<_>>().join(", ")
                    )),
            )
        })?;
        ctor(spec, ctx)
    }
}

impl<T: ?Sized> Clone for ModelFactory<T> {
    fn clone(&self) -> Self {
        Self {
            effect: self.effect.clone(),
            ctors: self.ctors.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ModelFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFactory")
            .field("effect", &self.effect)
            .field("types", &self.ctors.keys().collect::<Vec<_>>())
            .finish()
    }
}
