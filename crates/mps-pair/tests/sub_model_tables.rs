use indexmap::IndexMap;
use mps_blend::BlendingMethods;
use mps_core::{ModelSpec, PhaseError};
use mps_pair::{
    generate_pairs, generate_pairs_and_sub_models, BuildContext, ModelFactory, PairKey,
    PairRegistry,
};

trait Coefficient: Send + Sync {
    fn value(&self) -> f64;
}

struct Fixed(f64);

impl Coefficient for Fixed {
    fn value(&self) -> f64 {
        self.0
    }
}

fn fixed(
    spec: &ModelSpec,
    _ctx: &BuildContext<'_, dyn Coefficient>,
) -> Result<Box<dyn Coefficient>, PhaseError> {
    #[derive(serde::Deserialize)]
    struct Params {
        value: f64,
    }
    let params: Params = spec.parse_params()?;
    Ok(Box::new(Fixed(params.value)))
}

fn factory() -> ModelFactory<dyn Coefficient> {
    let mut factory = ModelFactory::new("coefficient");
    factory.register("fixed", fixed);
    factory
}

fn section(entries: &[(&str, f64)]) -> IndexMap<String, ModelSpec> {
    entries
        .iter()
        .map(|(key, value)| {
            (
                key.to_string(),
                ModelSpec::new("fixed").with_param("value", *value),
            )
        })
        .collect()
}

#[test]
fn ordered_pairs_hold_independent_models() {
    let mut registry = PairRegistry::new(["air", "water"]);
    let table = generate_pairs_and_sub_models(
        &section(&[("air in water", 0.5), ("water in air", 2.0)]),
        &factory(),
        &mut registry,
        &BlendingMethods::default(),
    )
    .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(registry.len(), 2);
    assert_eq!(table.get(&PairKey::ordered("air", "water")).unwrap().value(), 0.5);
    assert_eq!(table.get(&PairKey::ordered("water", "air")).unwrap().value(), 2.0);
    assert!(table.get(&PairKey::unordered("air", "water")).is_none());
}

#[test]
fn reversed_unordered_entry_is_a_duplicate() {
    let mut registry = PairRegistry::new(["air", "water"]);
    let err = generate_pairs_and_sub_models(
        &section(&[("air and water", 0.07), ("water and air", 0.05)]),
        &factory(),
        &mut registry,
        &BlendingMethods::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PhaseError::DuplicateModel(_)));
    assert_eq!(
        err.info().context.get("effect").map(String::as_str),
        Some("coefficient")
    );
}

#[test]
fn unknown_phase_aborts_generation() {
    let mut registry = PairRegistry::new(["air", "water"]);
    let err = generate_pairs_and_sub_models(
        &section(&[("oil and water", 0.02)]),
        &factory(),
        &mut registry,
        &BlendingMethods::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PhaseError::UnknownPhase(_)));
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("oil"));
}

#[test]
fn unknown_model_type_lists_valid_types() {
    let mut registry = PairRegistry::new(["air", "water"]);
    let mut entries = IndexMap::new();
    entries.insert("air and water".to_string(), ModelSpec::new("tabulated"));
    let err = generate_pairs_and_sub_models(
        &entries,
        &factory(),
        &mut registry,
        &BlendingMethods::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PhaseError::UnknownModelType(_)));
    assert!(err.info().hint.as_deref().unwrap_or_default().contains("fixed"));
}

#[test]
fn repeated_generation_passes_share_pairs() {
    let mut registry = PairRegistry::new(["air", "water"]);
    let entries = section(&[("air and water", 0.07)]);
    generate_pairs(&entries, &mut registry).unwrap();
    let first = registry.get(&PairKey::unordered("air", "water")).cloned().unwrap();
    generate_pairs_and_sub_models(
        &entries,
        &factory(),
        &mut registry,
        &BlendingMethods::default(),
    )
    .unwrap();
    let second = registry.get(&PairKey::unordered("water", "air")).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, second));
    assert_eq!(registry.len(), 1);
}
