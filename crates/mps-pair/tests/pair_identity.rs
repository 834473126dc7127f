use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mps_pair::{PairKey, PairRegistry};
use mps_core::PhaseError;
use proptest::prelude::*;

fn hash_of(key: &PairKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn registry() -> PairRegistry {
    PairRegistry::new(["water", "air", "solid"])
}

#[test]
fn unordered_keys_route_to_one_pair() {
    let mut registry = registry();
    registry.ensure(&PairKey::unordered("air", "water")).unwrap();
    registry.ensure(&PairKey::unordered("water", "air")).unwrap();
    assert_eq!(registry.len(), 1);

    let a = registry.get(&PairKey::unordered("air", "water")).unwrap();
    let b = registry.get(&PairKey::unordered("water", "air")).unwrap();
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.first().name, "air");
    assert_eq!(a.second().index, 0);
    assert_eq!(a.name(), "airAndWater");
}

#[test]
fn ensure_is_idempotent() {
    let mut registry = registry();
    let key = PairKey::ordered("air", "water");
    registry.ensure(&key).unwrap();
    let before = Arc::clone(registry.get(&key).unwrap());
    for _ in 0..3 {
        registry.ensure(&key).unwrap();
    }
    let after = registry.get(&key).unwrap();
    assert!(Arc::ptr_eq(&before, after));
    assert_eq!(registry.len(), 1);
}

#[test]
fn ordered_keys_are_directional() {
    let mut registry = registry();
    let air_in_water = PairKey::ordered("air", "water");
    let water_in_air = PairKey::ordered("water", "air");
    registry.ensure(&air_in_water).unwrap();
    registry.ensure(&water_in_air).unwrap();
    registry.ensure(&PairKey::unordered("air", "water")).unwrap();
    assert_eq!(registry.len(), 3);

    let pair = registry.get(&air_in_water).unwrap();
    assert_eq!(pair.dispersed().map(|p| p.name.as_str()), Some("air"));
    assert_eq!(pair.continuous().map(|p| p.name.as_str()), Some("water"));
    assert_eq!(pair.name(), "airInWater");
    assert!(registry.get(&PairKey::unordered("air", "water")).unwrap().dispersed().is_none());
}

#[test]
fn unknown_phase_is_rejected() {
    let mut registry = registry();
    let err = registry.ensure(&PairKey::unordered("oil", "water")).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownPhase(_)));
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("oil"));
    assert_eq!(
        err.info().context.get("pair").map(String::as_str),
        Some("oil and water")
    );
    assert!(registry.is_empty());
}

#[test]
fn pair_specifications_parse_and_print() {
    let key: PairKey = "air in water".parse().unwrap();
    assert!(key.is_ordered());
    assert_eq!(key.to_string(), "air in water");
    let key: PairKey = "  air   and water ".parse().unwrap();
    assert!(!key.is_ordered());
    assert!(matches!(
        "air with water".parse::<PairKey>(),
        Err(PhaseError::Config(_))
    ));

    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, "\"air and water\"");
    let decoded: PairKey = serde_json::from_str("\"water and air\"").unwrap();
    assert_eq!(decoded, key);
}

proptest! {
    #[test]
    fn unordered_keys_are_symmetric(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let ab = PairKey::unordered(a.clone(), b.clone());
        let ba = PairKey::unordered(b.clone(), a.clone());
        prop_assert_eq!(&ab, &ba);
        prop_assert_eq!(hash_of(&ab), hash_of(&ba));
        prop_assert_ne!(&ab, &PairKey::ordered(a, b));
    }

    #[test]
    fn ordered_keys_distinguish_direction(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        prop_assume!(a != b);
        let ab = PairKey::ordered(a.clone(), b.clone());
        let ba = PairKey::ordered(b, a);
        prop_assert_ne!(&ab, &ba);
        prop_assert_eq!(ab.reversed(), ba);
    }
}
