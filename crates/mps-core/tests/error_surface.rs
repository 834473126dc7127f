use mps_core::errors::{ErrorInfo, PhaseError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("phase", "air")
        .with_context("pair", "air and water")
}

#[test]
fn unknown_phase_surface() {
    let err = PhaseError::unknown_phase("oil");
    assert_eq!(err.info().code, "unknown-phase");
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("oil"));
    assert!(err.to_string().starts_with("unknown phase:"));
}

#[test]
fn duplicate_model_surface() {
    let err = PhaseError::DuplicateModel(sample_info("duplicate-model", "two models for one pair"));
    assert_eq!(err.info().code, "duplicate-model");
    assert!(err.info().context.contains_key("pair"));
}

#[test]
fn context_is_added_but_never_overwritten() {
    let err = PhaseError::Config(sample_info("model-params", "bad params"))
        .with_context("phase", "water")
        .with_context("effect", "surfaceTension");
    assert_eq!(err.info().context.get("phase").map(String::as_str), Some("air"));
    assert_eq!(
        err.info().context.get("effect").map(String::as_str),
        Some("surfaceTension")
    );
}

#[test]
fn display_lists_context_and_hint() {
    let err = PhaseError::Hook(
        ErrorInfo::new("phase-hook", "correctThermo failed")
            .with_context("hook", "correctThermo")
            .with_hint("inner failure"),
    );
    assert_eq!(
        err.to_string(),
        "hook error: correctThermo failed (code: phase-hook) | context: [hook=correctThermo] | hint: inner failure"
    );
}

#[test]
fn serde_error_surface() {
    let err = PhaseError::Serde(sample_info("yaml_deserialize", "schema mismatch"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Serde");
    assert_eq!(json["detail"]["code"], "yaml_deserialize");
    let decoded: PhaseError = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, err);
}
