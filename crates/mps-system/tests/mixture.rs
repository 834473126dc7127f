use std::sync::Arc;

use mps_core::{Mesh, Time};
use mps_system::{Catalog, PhaseSystem};

const TOL: f64 = 1e-9;

fn build(yaml: &str) -> PhaseSystem {
    let mesh = Arc::new(Mesh::line(4).unwrap());
    let time = Time::new(0.0, 0.1).unwrap();
    PhaseSystem::from_yaml_str(mesh, time, yaml, &Catalog::with_builtins()).unwrap()
}

fn assert_all_close(values: &[f64], expected: f64) {
    for value in values {
        assert!(
            (value - expected).abs() < TOL,
            "expected {expected}, got {value}"
        );
    }
}

const AIR_WATER: &str = r#"
phases: [air, water]
air: { type: uniform, alpha: 0.3, rho: 1000.0, velocity: [0.0, 2.0, 0.0], flux: 1.0 }
water: { type: uniform, alpha: 0.7, rho: 1.2, velocity: [1.0, 0.0, 0.0], flux: 2.0 }
"#;

#[test]
fn mixture_density_is_fraction_weighted_without_stationary_phases() {
    let system = build(AIR_WATER);
    let rho = system.rho();
    assert_eq!(rho.len(), 4);
    assert_all_close(rho.values(), 0.3 * 1000.0 + 0.7 * 1.2);
}

#[test]
fn mixture_velocity_is_fraction_weighted() {
    let system = build(AIR_WATER);
    let velocity = system.velocity();
    for value in velocity.values() {
        assert!((value.x - 0.7).abs() < TOL);
        assert!((value.y - 0.6).abs() < TOL);
        assert!(value.z.abs() < TOL);
    }
}

#[test]
fn initial_mixture_flux_sums_interpolated_phase_fluxes() {
    let system = build(AIR_WATER);
    let phi = system.phi();
    assert_eq!(phi.len(), system.mesh().n_faces());
    assert_all_close(phi.values(), 0.3 * 1.0 + 0.7 * 2.0);
    assert!(phi.auto_write());
    assert_eq!(system.persistent_fields(), vec!["phi".to_string()]);
    assert_all_close(system.dpdt().values(), 0.0);
}

#[test]
fn stationary_phases_do_not_dilute_the_mixture() {
    let system = build(
        r#"
phases: [water, bed]
water: { type: uniform, alpha: 0.6, rho: 1000.0, velocity: [0.5, 0.0, 0.0] }
bed: { type: uniform, alpha: 0.4, rho: 2500.0, stationary: true }
"#,
    );
    assert_eq!(system.moving_phases().count(), 1);
    assert_eq!(system.stationary_phases().next().unwrap().name(), "bed");
    assert_all_close(system.sum_alpha_moving().values(), 0.6);
    assert_all_close(system.rho().values(), 1000.0);
    for value in system.velocity().values() {
        assert!((value.x - 0.5).abs() < TOL);
    }
}

#[test]
fn vanishing_moving_fraction_yields_zero_rather_than_nan() {
    let system = build(
        r#"
phases: [water, bed]
water: { type: uniform, alpha: 0.0, rho: 1000.0 }
bed: { type: uniform, alpha: 1.0, rho: 2500.0, stationary: true }
"#,
    );
    let rho = system.rho();
    assert!(rho.values().iter().all(|value| *value == 0.0));
}

#[test]
#[should_panic(expected = "at least one moving phase")]
fn mixture_queries_require_a_moving_phase() {
    let system = build(
        r#"
phases: [bed]
bed: { type: uniform, alpha: 1.0, rho: 2500.0, stationary: true }
"#,
    );
    assert_eq!(system.moving_phases().count(), 0);
    let _ = system.rho();
}
