use mps_blend::{BlendingFactory, BlendingMethods, BlendingWeights};
use mps_core::{
    ModelSpec, Phase, PhaseError, PhaseFlags, ScalarField, SurfaceScalarField, VectorField,
};
use proptest::prelude::*;

struct StubPhase {
    name: String,
    alpha: ScalarField,
    rho: ScalarField,
    velocity: VectorField,
    phi: SurfaceScalarField,
    pressure: ScalarField,
}

impl StubPhase {
    fn new(name: &str, alpha: Vec<f64>) -> Self {
        let len = alpha.len();
        Self {
            name: name.to_string(),
            alpha: ScalarField::new(format!("alpha.{name}"), alpha),
            rho: ScalarField::uniform("rho", len, 1.0),
            velocity: VectorField::zeros("U", len),
            phi: SurfaceScalarField::zeros("phi", 0),
            pressure: ScalarField::zeros("p", len),
        }
    }
}

impl Phase for StubPhase {
    fn name(&self) -> &str {
        &self.name
    }
    fn index(&self) -> usize {
        0
    }
    fn alpha(&self) -> &ScalarField {
        &self.alpha
    }
    fn rho(&self) -> &ScalarField {
        &self.rho
    }
    fn velocity(&self) -> &VectorField {
        &self.velocity
    }
    fn phi(&self) -> &SurfaceScalarField {
        &self.phi
    }
    fn pressure(&self) -> &ScalarField {
        &self.pressure
    }
    fn pressure_old(&self) -> &ScalarField {
        &self.pressure
    }
    fn flags(&self) -> PhaseFlags {
        PhaseFlags::default()
    }
}

fn phases() -> Vec<String> {
    vec!["air".to_string(), "water".to_string()]
}

fn linear_spec() -> ModelSpec {
    serde_yaml::from_str(
        r#"
type: linear
minFullyContinuousAlpha: { air: 0.7, water: 0.7 }
minPartlyContinuousAlpha: { air: 0.3, water: 0.3 }
"#,
    )
    .expect("linear spec")
}

fn assert_partition(weights: &BlendingWeights) {
    for cell in 0..weights.segregated.len() {
        let f12 = weights.first_in_second.values()[cell];
        let f21 = weights.second_in_first.values()[cell];
        let fs = weights.segregated.values()[cell];
        for w in [f12, f21, fs] {
            assert!((0.0..=1.0).contains(&w), "weight {w} outside [0,1]");
        }
        assert!((f12 + f21 + fs - 1.0).abs() < 1e-12);
    }
}

#[test]
fn linear_blending_selects_dispersed_regime() {
    let factory = BlendingFactory::with_builtins();
    let method = factory
        .create("default", &linear_spec(), &phases())
        .expect("linear");
    let air = StubPhase::new("air", vec![0.1, 0.5, 0.9]);
    let water = StubPhase::new("water", vec![0.9, 0.5, 0.1]);
    let weights = method.weights(&air, &water).expect("weights");
    assert_partition(&weights);

    assert_eq!(weights.first_in_second.values()[0], 1.0);
    assert_eq!(weights.second_in_first.values()[0], 0.0);
    assert_eq!(weights.second_in_first.values()[2], 1.0);
    assert!((weights.segregated.values()[1] - 0.5).abs() < 1e-12);
}

#[test]
fn no_blending_is_a_hard_switch() {
    let factory = BlendingFactory::with_builtins();
    let spec = ModelSpec::new("none").with_param("continuousPhase", "water");
    let method = factory.create("hard", &spec, &phases()).expect("none");
    let air = StubPhase::new("air", vec![0.99]);
    let water = StubPhase::new("water", vec![0.01]);
    let weights = method.weights(&air, &water).expect("weights");
    assert_eq!(weights.first_in_second.values(), &[1.0]);
    assert_eq!(weights.segregated.values(), &[0.0]);
}

#[test]
fn unknown_type_is_rejected() {
    let factory = BlendingFactory::with_builtins();
    let err = factory
        .create("default", &ModelSpec::new("sigmoid"), &phases())
        .unwrap_err();
    assert!(matches!(err, PhaseError::UnknownBlendingMethod(_)));
    assert_eq!(err.info().context.get("type").map(String::as_str), Some("sigmoid"));
}

#[test]
fn per_phase_tables_must_name_known_phases() {
    let factory = BlendingFactory::with_builtins();
    let spec: ModelSpec = serde_yaml::from_str(
        "type: hyperbolic\nminContinuousAlpha: { oil: 0.5 }\ntransitionAlphaScale: 0.2\n",
    )
    .unwrap();
    let err = factory.create("smooth", &spec, &phases()).unwrap_err();
    assert!(matches!(err, PhaseError::UnknownPhase(_)));
}

#[test]
fn per_phase_tables_must_cover_every_phase() {
    let factory = BlendingFactory::with_builtins();
    let spec: ModelSpec = serde_yaml::from_str(
        r#"
type: linear
minFullyContinuousAlpha: { water: 0.7 }
minPartlyContinuousAlpha: { air: 0.3, water: 0.3 }
"#,
    )
    .unwrap();
    let err = factory.create("default", &spec, &phases()).unwrap_err();
    assert!(matches!(err, PhaseError::Config(_)));
    assert_eq!(err.info().code, "blending-missing-param");
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("air"));

    let spec: ModelSpec = serde_yaml::from_str(
        "type: hyperbolic\nminContinuousAlpha: { air: 0.5 }\ntransitionAlphaScale: 0.2\n",
    )
    .unwrap();
    let err = factory.create("smooth", &spec, &phases()).unwrap_err();
    assert_eq!(err.info().code, "blending-missing-param");
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("water"));
}

#[test]
fn method_table_lookup_by_name() {
    let factory = BlendingFactory::with_builtins();
    let section = [("default".to_string(), linear_spec())].into_iter().collect();
    let methods = BlendingMethods::from_config(&section, &factory, &phases()).unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods.get("default").unwrap().type_name(), "linear");
    assert!(matches!(
        methods.get("missing"),
        Err(PhaseError::UnknownBlendingMethod(_))
    ));
}

proptest! {
    #[test]
    fn hyperbolic_weights_partition_unity(a in 0.0f64..=1.0, scale in 0.05f64..1.0) {
        let factory = BlendingFactory::with_builtins();
        let spec: ModelSpec = serde_yaml::from_str(&format!(
            "type: hyperbolic\nminContinuousAlpha: {{ air: 0.5, water: 0.5 }}\ntransitionAlphaScale: {scale}\n"
        )).unwrap();
        let method = factory.create("smooth", &spec, &phases()).unwrap();
        let air = StubPhase::new("air", vec![a]);
        let water = StubPhase::new("water", vec![1.0 - a]);
        let weights = method.weights(&air, &water).unwrap();
        let total = weights.first_in_second.values()[0]
            + weights.second_in_first.values()[0]
            + weights.segregated.values()[0];
        prop_assert!((total - 1.0).abs() < 1e-12);
    }
}
