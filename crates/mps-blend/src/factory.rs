use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use mps_core::{ErrorInfo, ModelSpec, PhaseError};
use tracing::debug;

use crate::builtin::{Hyperbolic, Linear, NoBlending};
use crate::method::BlendingMethod;

/// Constructor signature: configured name, entry, system phase names.
pub type BlendingCtor =
    fn(&str, &ModelSpec, &[String]) -> Result<Box<dyn BlendingMethod>, PhaseError>;

/// Name-keyed registry of blending implementations.
///
/// Populate before reading any configuration; it is only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct BlendingFactory {
    ctors: BTreeMap<String, BlendingCtor>,
}

impl BlendingFactory {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `none`, `linear` and `hyperbolic`.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(NoBlending::TYPE_NAME, NoBlending::from_spec);
        factory.register(Linear::TYPE_NAME, Linear::from_spec);
        factory.register(Hyperbolic::TYPE_NAME, Hyperbolic::from_spec);
        factory
    }

    /// Registers (or replaces) a constructor under `type_name`.
    pub fn register(&mut self, type_name: impl Into<String>, ctor: BlendingCtor) {
        self.ctors.insert(type_name.into(), ctor);
    }

    /// Registered type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.ctors.keys().map(String::as_str)
    }

    /// Instantiates the method named `name` from its entry.
    pub fn create(
        &self,
        name: &str,
        spec: &ModelSpec,
        phases: &[String],
    ) -> Result<Box<dyn BlendingMethod>, PhaseError> {
        let ctor = self.ctors.get(&spec.type_name).ok_or_else(|| {
            PhaseError::UnknownBlendingMethod(
                ErrorInfo::new("blending-type", "unknown blending method type")
                    .with_context("blending", name)
                    .with_context("type", spec.type_name.clone())
                    .with_hint(format!(
                        "valid types: {}",
                        self.type_names().collect::<Vec<_>>().join(", ")
                    )),
            )
        })?;
        ctor(name, spec, phases)
    }
}

/// Constructed blending methods, keyed by configured name.
#[derive(Debug, Clone, Default)]
pub struct BlendingMethods {
    methods: IndexMap<String, Arc<dyn BlendingMethod>>,
}

impl BlendingMethods {
    /// Builds every entry of a `blending` configuration table.
    pub fn from_config(
        section: &IndexMap<String, ModelSpec>,
        factory: &BlendingFactory,
        phases: &[String],
    ) -> Result<Self, PhaseError> {
        let mut methods = IndexMap::with_capacity(section.len());
        for (name, spec) in section {
            let method: Arc<dyn BlendingMethod> = factory.create(name, spec, phases)?.into();
            debug!(blending = %name, kind = method.type_name(), "constructed blending method");
            methods.insert(name.clone(), method);
        }
        Ok(Self { methods })
    }

    /// Shared handle to the method configured as `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn BlendingMethod>, PhaseError> {
        self.methods.get(name).cloned().ok_or_else(|| {
            PhaseError::UnknownBlendingMethod(
                ErrorInfo::new("blending-name", "no blending method configured under this name")
                    .with_context("blending", name),
            )
        })
    }

    /// Configured names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Number of configured methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// True when no method is configured.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
