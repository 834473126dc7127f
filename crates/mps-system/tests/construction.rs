use std::io::Write;
use std::sync::Arc;

use mps_core::{Mesh, PhaseError, Time};
use mps_pair::PairKey;
use mps_system::{load_config, Catalog, PhaseSystem, PhaseSystemConfig};

fn mesh() -> Arc<Mesh> {
    Arc::new(Mesh::line(3).unwrap())
}

fn time() -> Time {
    Time::new(0.0, 0.1).unwrap()
}

fn build(yaml: &str) -> Result<PhaseSystem, PhaseError> {
    PhaseSystem::from_yaml_str(mesh(), time(), yaml, &Catalog::with_builtins())
}

const PHASES: &str = r#"
phases: [air, water]
air: { type: uniform, alpha: 0.3, rho: 1.2 }
water: { type: uniform, alpha: 0.7, rho: 1000.0 }
"#;

#[test]
fn unconfigured_pairs_fall_back_to_defaults() {
    let system = build(PHASES).unwrap();
    let key = PairKey::unordered("air", "water");
    let sigma = system.sigma(&key).unwrap();
    assert_eq!(sigma.len(), 3);
    assert!(sigma.values().iter().all(|value| *value == 0.0));
    let aspect = system.aspect_ratio(&PairKey::ordered("air", "water")).unwrap();
    assert!(aspect.values().iter().all(|value| *value == 1.0));
    assert_eq!(system.sigma_patch(&key, 0).unwrap(), vec![0.0]);
    assert!(system.pairs().is_empty());
}

#[test]
fn configured_models_are_routed_by_pair() {
    let yaml = format!(
        "{PHASES}
surfaceTension:
  water and air: {{ type: constant, sigma: 0.07 }}
aspectRatio:
  air in water: {{ type: constant, E0: 0.8 }}
"
    );
    let system = build(&yaml).unwrap();
    let sigma = system.sigma(&PairKey::unordered("air", "water")).unwrap();
    assert!(sigma.values().iter().all(|value| *value == 0.07));
    assert_eq!(
        system.sigma_patch(&PairKey::unordered("water", "air"), 1).unwrap(),
        vec![0.07]
    );

    let aspect = system.aspect_ratio(&PairKey::ordered("air", "water")).unwrap();
    assert!(aspect.values().iter().all(|value| *value == 0.8));
    let reversed = system.aspect_ratio(&PairKey::ordered("water", "air")).unwrap();
    assert!(reversed.values().iter().all(|value| *value == 1.0));
    assert_eq!(system.pairs().len(), 2);
}

#[test]
fn reversed_surface_tension_entries_are_duplicates() {
    let yaml = format!(
        "{PHASES}
surfaceTension:
  air and water: {{ type: constant, sigma: 0.07 }}
  water and air: {{ type: constant, sigma: 0.05 }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::DuplicateModel(_)));
    assert_eq!(
        err.info().context.get("effect").map(String::as_str),
        Some("surfaceTension")
    );
}

#[test]
fn repeated_section_keys_are_duplicates() {
    let yaml = format!(
        "{PHASES}
surfaceTension:
  air and water: {{ type: constant, sigma: 0.07 }}
  air and water: {{ type: constant, sigma: 0.05 }}
"
    );
    let config = PhaseSystemConfig::from_yaml_str(&yaml).unwrap();
    assert_eq!(config.surface_tension.repeated_keys(), ["air and water"]);
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::DuplicateModel(_)));
    assert_eq!(
        err.info().context.get("pair").map(String::as_str),
        Some("air and water")
    );

    let yaml = format!(
        "{PHASES}
blending:
  default: {{ type: none, continuousPhase: water }}
  default: {{ type: none, continuousPhase: air }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert_eq!(err.info().code, "blending-duplicate");
}

#[test]
fn unknown_phase_in_pair_aborts_construction() {
    let yaml = format!(
        "{PHASES}
aspectRatio:
  oil in water: {{ type: constant, E0: 0.5 }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownPhase(_)));
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("oil"));
    assert_eq!(
        err.info().context.get("effect").map(String::as_str),
        Some("aspectRatio")
    );
}

#[test]
fn unknown_blending_type_aborts_construction() {
    let yaml = format!(
        "{PHASES}
blending:
  default: {{ type: cubic }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownBlendingMethod(_)));
    assert!(err.info().hint.as_deref().unwrap_or_default().contains("linear"));
}

#[test]
fn unknown_model_and_phase_types_are_reported() {
    let yaml = format!(
        "{PHASES}
surfaceTension:
  air and water: {{ type: tabulated }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownModelType(_)));
    assert_eq!(
        err.info().context.get("pair").map(String::as_str),
        Some("air and water")
    );

    let err = build(
        r#"
phases: [air]
air: { type: perfectGas, alpha: 1.0, rho: 1.2 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, PhaseError::UnknownModelType(_)));
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("air"));
}

#[test]
fn phase_list_must_be_complete() {
    let err = build(
        r#"
phases: [air, water]
air: { type: uniform, alpha: 1.0, rho: 1.2 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, PhaseError::Config(_)));
    assert_eq!(err.info().code, "phase-section");

    let err = build("phases: []\n").unwrap_err();
    assert_eq!(err.info().code, "phases-empty");
}

#[test]
fn incompressible_requires_every_phase() {
    let three = r#"
phases: [air, water, oil]
air: { type: uniform, alpha: 0.2, rho: 1.2 }
water: { type: uniform, alpha: 0.5, rho: 1000.0 }
oil: { type: uniform, alpha: 0.3, rho: 800.0 }
"#;
    assert!(build(three).unwrap().incompressible());

    let flipped = three.replace("rho: 1.2 }", "rho: 1.2, incompressible: false }");
    let system = build(&flipped).unwrap();
    assert!(!system.incompressible());
    assert!(!system.implicit_phase_pressure());
    assert!(!system.implicit_phase_pressure_of(system.phase("air").unwrap()));
}

#[test]
fn views_preserve_system_order() {
    let system = build(
        r#"
phases: [gas, liquid, bed]
gas: { type: uniform, alpha: 0.2, rho: 1.2, isothermal: false, pure: false }
liquid: { type: uniform, alpha: 0.5, rho: 1000.0, pure: false }
bed: { type: uniform, alpha: 0.3, rho: 2500.0, stationary: true, isothermal: false }
"#,
    )
    .unwrap();
    let moving: Vec<_> = system.moving_phases().map(|p| p.name()).collect();
    assert_eq!(moving, ["gas", "liquid"]);
    let anisothermal: Vec<_> = system.anisothermal_phases().map(|p| p.name()).collect();
    assert_eq!(anisothermal, ["gas", "bed"]);
    let multicomponent: Vec<_> = system.multicomponent_phases().map(|p| p.name()).collect();
    assert_eq!(multicomponent, ["gas", "liquid"]);
    assert_eq!(system.phase_by_index(2).unwrap().name(), "bed");
    assert!(matches!(
        system.phase("steam"),
        Err(PhaseError::UnknownPhase(_))
    ));
}

#[test]
fn blended_model_follows_the_flow_regime() {
    let yaml = format!(
        "{PHASES}
blending:
  default:
    type: linear
    minFullyContinuousAlpha: {{ air: 0.7, water: 0.7 }}
    minPartlyContinuousAlpha: {{ air: 0.3, water: 0.3 }}
surfaceTension:
  air and water:
    type: blended
    method: default
    firstInSecond: {{ type: constant, sigma: 0.07 }}
    segregated: {{ type: constant, sigma: 0.05 }}
"
    );
    let system = build(&yaml).unwrap();
    let sigma = system.sigma(&PairKey::unordered("air", "water")).unwrap();
    for value in sigma.values() {
        assert!((value - 0.07).abs() < 1e-12);
    }
    assert_eq!(system.blending_methods().names().collect::<Vec<_>>(), ["default"]);
}

#[test]
fn blended_model_needs_a_configured_method() {
    let yaml = format!(
        "{PHASES}
surfaceTension:
  air and water:
    type: blended
    method: missing
    segregated: {{ type: constant, sigma: 0.05 }}
"
    );
    let err = build(&yaml).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownBlendingMethod(_)));
}

#[test]
fn configuration_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PHASES.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.phases, ["air", "water"]);

    let system =
        PhaseSystem::from_path(mesh(), time(), file.path(), &Catalog::with_builtins()).unwrap();
    let from_str = PhaseSystemConfig::from_yaml_str(PHASES).unwrap();
    assert_eq!(system.config(), &from_str);
    assert_eq!(system.config_hash().len(), 64);

    let missing = load_config(&file.path().with_extension("absent")).unwrap_err();
    assert_eq!(missing.info().code, "config-read");
}
