use indexmap::IndexMap;
use mps_blend::BlendingMethods;
use mps_core::{ModelSpec, PhaseError};
use tracing::debug;

use crate::factory::{BuildContext, ModelFactory};
use crate::key::PairKey;
use crate::registry::PairRegistry;
use crate::table::SubModelTable;

/// Registers a pair for every key of a configuration section.
pub fn generate_pairs<V>(
    section: &IndexMap<String, V>,
    registry: &mut PairRegistry,
) -> Result<(), PhaseError> {
    for spec in section.keys() {
        let key: PairKey = spec.parse()?;
        registry.ensure(&key)?;
    }
    Ok(())
}

/// Builds the sub-model table of one effect from its configuration section.
///
/// Each entry is keyed by a pair specification (`"a and b"` or `"a in b"`).
/// For every entry the pair is registered, the model is instantiated through
/// `factory` and inserted under the key; a second entry for the same key
/// fails with [`PhaseError::DuplicateModel`].
pub fn generate_pairs_and_sub_models<T: ?Sized>(
    section: &IndexMap<String, ModelSpec>,
    factory: &ModelFactory<T>,
    registry: &mut PairRegistry,
    blending: &BlendingMethods,
) -> Result<SubModelTable<T>, PhaseError> {
    let effect = factory.effect();
    let mut table = SubModelTable::new(effect);
    for (spec_key, spec) in section {
        let key: PairKey = spec_key
            .parse()
            .map_err(|err: PhaseError| err.with_context("effect", effect))?;
        registry
            .ensure(&key)
            .map_err(|err| err.with_context("effect", effect))?;
        let pair = registry.pair(&key)?;
        let ctx = BuildContext {
            effect,
            pair,
            blending,
            factory,
        };
        let model = factory
            .create(spec, &ctx)
            .map_err(|err| err.with_context("pair", key.to_string()))?;
        table.insert(key, model)?;
        debug!(effect, pair = %spec_key, model = %spec.type_name, "constructed sub-model");
    }
    Ok(table)
}
