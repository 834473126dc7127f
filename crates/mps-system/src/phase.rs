use std::collections::BTreeMap;
use std::fmt;

use mps_core::{
    ErrorInfo, Mesh, ModelSpec, Phase, PhaseError, PhaseFlags, ScalarField, SurfaceScalarField,
    VectorField,
};
use nalgebra::Vector3;
use serde::Deserialize;

/// Constructor signature: phase name, index, configuration section, mesh.
pub type PhaseCtor = fn(&str, usize, &ModelSpec, &Mesh) -> Result<Box<dyn Phase>, PhaseError>;

/// Type-name keyed phase constructors.
#[derive(Clone, Default)]
pub struct PhaseFactory {
    ctors: BTreeMap<String, PhaseCtor>,
}

impl PhaseFactory {
    /// Empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory holding the `uniform` phase type.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(UniformPhase::TYPE_NAME, UniformPhase::from_spec);
        factory
    }

    /// Registers (or replaces) a constructor under `type_name`.
    pub fn register(&mut self, type_name: impl Into<String>, ctor: PhaseCtor) -> &mut Self {
        self.ctors.insert(type_name.into(), ctor);
        self
    }

    /// Instantiates the phase described by `spec`.
    pub fn create(
        &self,
        name: &str,
        index: usize,
        spec: &ModelSpec,
        mesh: &Mesh,
    ) -> Result<Box<dyn Phase>, PhaseError> {
        let ctor = self.ctors.get(&spec.type_name).ok_or_else(|| {
            PhaseError::UnknownModelType(
                ErrorInfo::new("phase-type", "unknown phase type")
                    .with_context("phase", name)
                    .with_context("type", spec.type_name.clone())
                    .with_hint(format!(
                        "valid types: {}",
                        self.ctors.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            )
        })?;
        ctor(name, index, spec, mesh).map_err(|err| err.with_context("phase", name))
    }
}

impl fmt::Debug for PhaseFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseFactory")
            .field("types", &self.ctors.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn default_pressure() -> f64 {
    1.0e5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniformParams {
    alpha: f64,
    rho: f64,
    #[serde(default)]
    velocity: [f64; 3],
    #[serde(default = "default_pressure")]
    pressure: f64,
    #[serde(default)]
    flux: f64,
    #[serde(default)]
    requests_dpdt: bool,
    #[serde(flatten)]
    flags: PhaseFlags,
}

/// Phase initialised with spatially uniform fields.
///
/// Lifecycle hooks are no-ops apart from continuity correction, which keeps
/// the last source handed in. Fields can be overwritten through the setters.
#[derive(Debug, Clone)]
pub struct UniformPhase {
    name: String,
    index: usize,
    alpha: ScalarField,
    rho: ScalarField,
    velocity: VectorField,
    phi: SurfaceScalarField,
    pressure: ScalarField,
    pressure_old: ScalarField,
    flags: PhaseFlags,
    requests_dpdt: bool,
    continuity_source: Option<ScalarField>,
}

impl UniformPhase {
    /// Registered type name.
    pub const TYPE_NAME: &'static str = "uniform";

    /// Builds the phase from its configuration section.
    pub fn from_spec(
        name: &str,
        index: usize,
        spec: &ModelSpec,
        mesh: &Mesh,
    ) -> Result<Box<dyn Phase>, PhaseError> {
        let params: UniformParams = spec.parse_params()?;
        if !(0.0..=1.0).contains(&params.alpha) {
            return Err(PhaseError::Config(
                ErrorInfo::new("phase-alpha", "volume fraction outside [0, 1]")
                    .with_context("phase", name)
                    .with_context("alpha", params.alpha.to_string()),
            ));
        }
        let n = mesh.n_cells();
        let pressure = ScalarField::uniform(format!("p.{name}"), n, params.pressure);
        Ok(Box::new(Self {
            name: name.to_string(),
            index,
            alpha: ScalarField::uniform(format!("alpha.{name}"), n, params.alpha),
            rho: ScalarField::uniform(format!("rho.{name}"), n, params.rho),
            velocity: VectorField::uniform(
                format!("U.{name}"),
                n,
                Vector3::from(params.velocity),
            ),
            phi: SurfaceScalarField::new(format!("phi.{name}"), vec![params.flux; mesh.n_faces()]),
            pressure_old: pressure.clone(),
            pressure,
            flags: params.flags,
            requests_dpdt: params.requests_dpdt,
            continuity_source: None,
        }))
    }

    /// Replaces the volume fraction values.
    pub fn set_alpha(&mut self, values: Vec<f64>) {
        self.alpha = ScalarField::new(self.alpha.name().to_string(), values);
    }

    /// Replaces the density values.
    pub fn set_rho(&mut self, values: Vec<f64>) {
        self.rho = ScalarField::new(self.rho.name().to_string(), values);
    }

    /// Advances the pressure, keeping the current values as the old level.
    pub fn set_pressure(&mut self, values: Vec<f64>) {
        let name = self.pressure.name().to_string();
        self.pressure_old = std::mem::replace(&mut self.pressure, ScalarField::new(name, values));
    }

    /// Last source applied by continuity correction.
    pub fn continuity_source(&self) -> Option<&ScalarField> {
        self.continuity_source.as_ref()
    }
}

impl Phase for UniformPhase {
    fn name(&self) -> &str {
        &self.name
    }

    fn index(&self) -> usize {
        self.index
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
        &self.pressure_old
    }

    fn flags(&self) -> PhaseFlags {
        self.flags
    }

    fn requests_dpdt(&self) -> bool {
        self.requests_dpdt
    }

    fn correct_continuity_error(&mut self, source: &ScalarField) -> Result<(), PhaseError> {
        self.continuity_source = Some(source.clone());
        Ok(())
    }

    fn read(&mut self, spec: &ModelSpec) -> Result<bool, PhaseError> {
        if spec.type_name != Self::TYPE_NAME {
            return Ok(false);
        }
        let params: UniformParams = spec.parse_params()?;
        self.flags = params.flags;
        self.requests_dpdt = params.requests_dpdt;
        Ok(true)
    }
}
