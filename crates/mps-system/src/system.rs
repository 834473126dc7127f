use std::path::Path;
use std::sync::Arc;

use mps_blend::BlendingMethods;
use mps_core::{
    ErrorInfo, Hook, Mesh, Phase, PhaseError, ScalarField, SurfaceScalarField, Time, VectorField,
};
use mps_pair::{
    generate_pairs_and_sub_models, Pair, PairContext, PairKey, PairRegistry, SubModelTable,
};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{load_config, PhaseSystemConfig};
use crate::models::{AspectRatioModel, SurfaceTensionModel, ASPECT_RATIO, SURFACE_TENSION};
use crate::serde::stable_hash_string;
use crate::sources::{MassSource, MassTransfer, MassTransferRates};

/// Floor applied to the moving-phase fraction sum when renormalising.
pub const VSMALL: f64 = 1.0e-300;

fn hook_error(phase: &str, hook: Hook, err: PhaseError) -> PhaseError {
    PhaseError::Hook(
        ErrorInfo::new("phase-hook", format!("{hook} failed"))
            .with_context("phase", phase)
            .with_context("hook", hook.as_str())
            .with_hint(err.to_string()),
    )
}

fn check_phase(phase: &dyn Phase, name: &str, index: usize, mesh: &Mesh) -> Result<(), PhaseError> {
    if phase.name() != name || phase.index() != index {
        return Err(PhaseError::Config(
            ErrorInfo::new("phase-identity", "phase reports a different name or index")
                .with_context("phase", name)
                .with_context("reported", format!("{}#{}", phase.name(), phase.index())),
        ));
    }
    let n = mesh.n_cells();
    phase.alpha().check_len(n)?;
    phase.rho().check_len(n)?;
    phase.velocity().check_len(n)?;
    phase.pressure().check_len(n)?;
    phase.pressure_old().check_len(n)?;
    phase.phi().check_len(mesh.n_faces())
}

fn calc_phi(mesh: &Mesh, phases: &[Box<dyn Phase>]) -> SurfaceScalarField {
    let mut phi = SurfaceScalarField::zeros("phi", mesh.n_faces());
    for phase in phases {
        phi += &(&mesh.interpolate(phase.alpha()) * phase.phi());
    }
    phi.set_auto_write(true);
    phi
}

/// Indices of the phases in each derived view, preserving system order.
#[derive(Debug, Clone, Default)]
struct Views {
    moving: Vec<usize>,
    stationary: Vec<usize>,
    anisothermal: Vec<usize>,
    multicomponent: Vec<usize>,
}

impl Views {
    fn classify(phases: &[Box<dyn Phase>]) -> Self {
        let mut views = Self::default();
        for (index, phase) in phases.iter().enumerate() {
            if phase.stationary() {
                views.stationary.push(index);
            } else {
                views.moving.push(index);
            }
            if !phase.isothermal() {
                views.anisothermal.push(index);
            }
            if !phase.pure() {
                views.multicomponent.push(index);
            }
        }
        views
    }
}

/// Owner of a set of coexisting phases and their pairwise interfacial models.
///
/// Built once from a [`PhaseSystemConfig`]; afterwards the host loop drives
/// the `correct*` hooks each time step and queries mixture quantities.
pub struct PhaseSystem {
    mesh: Arc<Mesh>,
    time: Time,
    config: PhaseSystemConfig,
    config_hash: String,
    phases: Vec<Box<dyn Phase>>,
    views: Views,
    pairs: PairRegistry,
    blending: BlendingMethods,
    surface_tension: SubModelTable<dyn SurfaceTensionModel>,
    aspect_ratio: SubModelTable<dyn AspectRatioModel>,
    sources: Vec<Box<dyn MassSource>>,
    mass_transfer: Option<Box<dyn MassTransfer>>,
    phi: SurfaceScalarField,
    dpdt: ScalarField,
}

impl PhaseSystem {
    /// Builds the system: phases, views, mixture flux, blending methods, the
    /// per-effect model tables and a first kinematics pass.
    ///
    /// Any failure aborts construction.
    pub fn new(
        mesh: Arc<Mesh>,
        time: Time,
        config: PhaseSystemConfig,
        catalog: &Catalog,
    ) -> Result<Self, PhaseError> {
        config.validate()?;
        let config_hash = stable_hash_string(&config)?;

        let mut phases = Vec::with_capacity(config.phases.len());
        for (index, name) in config.phases.iter().enumerate() {
            let phase = catalog
                .phases
                .create(name, index, config.phase_spec(name)?, &mesh)?;
            check_phase(phase.as_ref(), name, index, &mesh)
                .map_err(|err| err.with_context("phase", name.as_str()))?;
            phases.push(phase);
        }
        let views = Views::classify(&phases);
        let phi = calc_phi(&mesh, &phases);
        let dpdt = ScalarField::zeros("dpdt", mesh.n_cells());

        let mut pairs = PairRegistry::new(config.phases.iter().cloned());
        let blending =
            BlendingMethods::from_config(&config.blending, &catalog.blending, &config.phases)?;
        let surface_tension = generate_pairs_and_sub_models(
            &config.surface_tension,
            &catalog.surface_tension,
            &mut pairs,
            &blending,
        )?;
        let aspect_ratio = generate_pairs_and_sub_models(
            &config.aspect_ratio,
            &catalog.aspect_ratio,
            &mut pairs,
            &blending,
        )?;

        let mut system = Self {
            mesh,
            time,
            config,
            config_hash,
            phases,
            views,
            pairs,
            blending,
            surface_tension,
            aspect_ratio,
            sources: Vec::new(),
            mass_transfer: None,
            phi,
            dpdt,
        };
        system.correct_kinematics()?;

        info!(
            phases = system.phases.len(),
            moving = system.views.moving.len(),
            stationary = system.views.stationary.len(),
            anisothermal = system.views.anisothermal.len(),
            multicomponent = system.views.multicomponent.len(),
            pairs = system.pairs.len(),
            blending = system.blending.len(),
            surface_tension = system.surface_tension.len(),
            aspect_ratio = system.aspect_ratio.len(),
            "constructed phase system"
        );
        if system.views.moving.is_empty() {
            warn!("phase system has no moving phases; mixture density and velocity are unavailable");
        }
        Ok(system)
    }

    /// Builds a system from a YAML phase properties document.
    pub fn from_yaml_str(
        mesh: Arc<Mesh>,
        time: Time,
        yaml: &str,
        catalog: &Catalog,
    ) -> Result<Self, PhaseError> {
        Self::new(mesh, time, PhaseSystemConfig::from_yaml_str(yaml)?, catalog)
    }

    /// Builds a system from a YAML phase properties file.
    pub fn from_path(
        mesh: Arc<Mesh>,
        time: Time,
        path: &Path,
        catalog: &Catalog,
    ) -> Result<Self, PhaseError> {
        Self::new(mesh, time, load_config(path)?, catalog)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Advances the time seen by time derivatives.
    pub fn set_time(&mut self, time: Time) {
        self.time = time;
    }

    /// Configuration currently in effect.
    pub fn config(&self) -> &PhaseSystemConfig {
        &self.config
    }

    /// SHA-256 fingerprint of the configuration in effect.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// All phases in system order.
    pub fn phases(&self) -> impl Iterator<Item = &dyn Phase> + '_ {
        self.phases.iter().map(|phase| phase.as_ref())
    }

    /// Number of phases.
    pub fn n_phases(&self) -> usize {
        self.phases.len()
    }

    pub fn phase_by_index(&self, index: usize) -> Option<&dyn Phase> {
        self.phases.get(index).map(|phase| phase.as_ref())
    }

    /// Phase called `name`.
    pub fn phase(&self, name: &str) -> Result<&dyn Phase, PhaseError> {
        self.phases
            .iter()
            .find(|phase| phase.name() == name)
            .map(|phase| phase.as_ref())
            .ok_or_else(|| PhaseError::unknown_phase(name))
    }

    fn view<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a dyn Phase> + 'a {
        indices.iter().map(move |&index| self.phases[index].as_ref())
    }

    /// Phases that are not stationary.
    pub fn moving_phases(&self) -> impl Iterator<Item = &dyn Phase> + '_ {
        self.view(&self.views.moving)
    }

    pub fn stationary_phases(&self) -> impl Iterator<Item = &dyn Phase> + '_ {
        self.view(&self.views.stationary)
    }

    /// Phases carrying an energy equation.
    pub fn anisothermal_phases(&self) -> impl Iterator<Item = &dyn Phase> + '_ {
        self.view(&self.views.anisothermal)
    }

    /// Phases with more than one component.
    pub fn multicomponent_phases(&self) -> impl Iterator<Item = &dyn Phase> + '_ {
        self.view(&self.views.multicomponent)
    }

    pub fn pairs(&self) -> &PairRegistry {
        &self.pairs
    }

    pub fn blending_methods(&self) -> &BlendingMethods {
        &self.blending
    }

    pub fn surface_tension_models(&self) -> &SubModelTable<dyn SurfaceTensionModel> {
        &self.surface_tension
    }

    pub fn aspect_ratio_models(&self) -> &SubModelTable<dyn AspectRatioModel> {
        &self.aspect_ratio
    }

    /// Mixture volumetric flux.
    pub fn phi(&self) -> &SurfaceScalarField {
        &self.phi
    }

    /// Mixture volumetric flux, updated by the pressure-velocity coupling.
    pub fn phi_mut(&mut self) -> &mut SurfaceScalarField {
        &mut self.phi
    }

    /// Pressure time derivative shared by anisothermal phases.
    pub fn dpdt(&self) -> &ScalarField {
        &self.dpdt
    }

    /// Names of the system-owned fields the host should persist.
    pub fn persistent_fields(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.phi.auto_write() {
            names.push(self.phi.name().to_string());
        }
        if self.dpdt.auto_write() {
            names.push(self.dpdt.name().to_string());
        }
        names
    }

    /// Registers an injected volumetric mass source.
    pub fn add_source(&mut self, source: Box<dyn MassSource>) {
        debug!(source = source.name(), "registered mass source");
        self.sources.push(source);
    }

    /// Installs the interfacial mass transfer model.
    pub fn set_mass_transfer(&mut self, model: Box<dyn MassTransfer>) {
        self.mass_transfer = Some(model);
    }

    fn context<'a>(&'a self, pair: &'a Pair) -> PairContext<'a> {
        PairContext {
            pair,
            first: self.phases[pair.first().index].as_ref(),
            second: self.phases[pair.second().index].as_ref(),
            mesh: &self.mesh,
        }
    }

    fn assert_moving(&self) {
        assert!(
            !self.views.moving.is_empty(),
            "mixture quantities need at least one moving phase"
        );
    }

    /// Sum of the moving-phase volume fractions.
    pub fn sum_alpha_moving(&self) -> ScalarField {
        let mut sum = ScalarField::zeros("sumAlphaMoving", self.mesh.n_cells());
        for phase in self.moving_phases() {
            sum += phase.alpha();
        }
        sum
    }

    /// Mixture density over the moving phases.
    ///
    /// When stationary phases are present the fraction-weighted sum is divided
    /// by [`Self::sum_alpha_moving`], floored at [`VSMALL`].
    ///
    /// # Panics
    ///
    /// Panics when the system has no moving phase.
    pub fn rho(&self) -> ScalarField {
        self.assert_moving();
        let mut rho = ScalarField::zeros("rho", self.mesh.n_cells());
        for phase in self.moving_phases() {
            rho += &(phase.alpha() * phase.rho());
        }
        if self.views.stationary.is_empty() {
            rho
        } else {
            rho.divide_clamped(&self.sum_alpha_moving(), VSMALL)
        }
    }

    /// Mixture velocity over the moving phases, normalised like [`Self::rho`].
    ///
    /// # Panics
    ///
    /// Panics when the system has no moving phase.
    pub fn velocity(&self) -> VectorField {
        self.assert_moving();
        let mut velocity = VectorField::zeros("U", self.mesh.n_cells());
        for phase in self.moving_phases() {
            velocity += &phase.velocity().weighted(phase.alpha());
        }
        if self.views.stationary.is_empty() {
            velocity
        } else {
            velocity.divide_clamped(&self.sum_alpha_moving(), VSMALL)
        }
    }

    /// Surface tension for the pair `key`; zero when no model is configured.
    pub fn sigma(&self, key: &PairKey) -> Result<ScalarField, PhaseError> {
        match self.surface_tension.get(key) {
            Some(model) => {
                let pair = self.pairs.pair(key)?;
                model.sigma(&self.context(pair))
            }
            None => Ok(ScalarField::zeros(
                "surfaceTensionModel:sigma",
                self.mesh.n_cells(),
            )),
        }
    }

    /// Surface tension on boundary patch `patch`; zero when no model is configured.
    pub fn sigma_patch(&self, key: &PairKey, patch: usize) -> Result<Vec<f64>, PhaseError> {
        match self.surface_tension.get(key) {
            Some(model) => {
                let pair = self.pairs.pair(key)?;
                model.sigma_patch(&self.context(pair), patch)
            }
            None => Ok(vec![0.0; self.mesh.patch(patch)?.len()]),
        }
    }

    /// Aspect ratio for the pair `key`; one (spherical) when no model is configured.
    pub fn aspect_ratio(&self, key: &PairKey) -> Result<ScalarField, PhaseError> {
        match self.aspect_ratio.get(key) {
            Some(model) => {
                let pair = self.pairs.pair(key)?;
                model.aspect_ratio(&self.context(pair))
            }
            None => Ok(ScalarField::uniform(
                "aspectRatioModel:E",
                self.mesh.n_cells(),
                1.0,
            )),
        }
    }

    /// Interfacial mass transfer rate for the pair `key`.
    ///
    /// Zero unless a [`MassTransfer`] model is installed.
    pub fn dmdtf(&self, key: &PairKey) -> Result<ScalarField, PhaseError> {
        let pair = match self.pairs.get(key) {
            Some(pair) => Pair::clone(pair),
            None => self.pairs.resolve(key)?,
        };
        match &self.mass_transfer {
            Some(model) => model.dmdtf(&self.context(&pair)),
            None => Ok(ScalarField::zeros(
                format!("dmdtf.{}", pair.name()),
                self.mesh.n_cells(),
            )),
        }
    }

    /// Per-phase mass transfer rates accumulated over every registered pair.
    pub fn dmdts(&self) -> Result<MassTransferRates, PhaseError> {
        let mut rates = MassTransferRates::new(self.phases.len());
        if let Some(model) = &self.mass_transfer {
            for pair in self.pairs.iter() {
                let dmdtf = model
                    .dmdtf(&self.context(pair))
                    .map_err(|err| err.with_context("pair", pair.key().to_string()))?;
                rates.add(pair.first().index, &dmdtf);
                rates.add(pair.second().index, &dmdtf.scaled(-1.0));
            }
        }
        Ok(rates)
    }

    /// True when every phase is incompressible.
    pub fn incompressible(&self) -> bool {
        self.phases.iter().all(|phase| phase.incompressible())
    }

    /// Whether any phase pressure is solved implicitly.
    pub fn implicit_phase_pressure(&self) -> bool {
        false
    }

    /// Whether the pressure of `phase` is solved implicitly.
    pub fn implicit_phase_pressure_of(&self, _phase: &dyn Phase) -> bool {
        false
    }

    /// Pressure-coupled solution step; the base system has nothing to solve.
    pub fn solve(&mut self, _r_aus: &[ScalarField], _r_aufs: &[SurfaceScalarField]) {}

    fn for_each_phase(
        &mut self,
        hook: Hook,
        step: fn(&mut dyn Phase) -> Result<(), PhaseError>,
    ) -> Result<(), PhaseError> {
        for phase in self.phases.iter_mut() {
            step(phase.as_mut()).map_err(|err| hook_error(phase.name(), hook, err))?;
        }
        Ok(())
    }

    /// Runs the general correction of every phase.
    pub fn correct(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::Correct, |phase| phase.correct())
    }

    /// Corrects the kinematics of every phase and refreshes `dpdt` once if
    /// any phase asks for it, using the pressure of the first phase.
    pub fn correct_kinematics(&mut self) -> Result<(), PhaseError> {
        let mut update_dpdt = false;
        for phase in self.phases.iter_mut() {
            phase
                .correct_kinematics()
                .map_err(|err| hook_error(phase.name(), Hook::CorrectKinematics, err))?;
            update_dpdt |= phase.requests_dpdt();
        }
        if update_dpdt {
            if let Some(reference) = self.phases.first() {
                self.dpdt = self
                    .time
                    .ddt(reference.pressure(), reference.pressure_old())
                    .with_name("dpdt");
                debug!(phase = reference.name(), "updated pressure time derivative");
            }
        }
        Ok(())
    }

    pub fn correct_thermo(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::CorrectThermo, |phase| phase.correct_thermo())
    }

    pub fn correct_reactions(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::CorrectReactions, |phase| phase.correct_reactions())
    }

    pub fn correct_species(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::CorrectSpecies, |phase| phase.correct_species())
    }

    pub fn correct_turbulence(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::CorrectTurbulence, |phase| phase.correct_turbulence())
    }

    pub fn correct_energy_transport(&mut self) -> Result<(), PhaseError> {
        self.for_each_phase(Hook::CorrectEnergyTransport, |phase| {
            phase.correct_energy_transport()
        })
    }

    /// Hands every moving phase its combined mass source: injected sources
    /// acting on its density plus its accumulated mass transfer rate.
    pub fn correct_continuity_error(&mut self) -> Result<(), PhaseError> {
        let dmdts = self.dmdts()?;
        let n_cells = self.mesh.n_cells();
        for index in self.views.moving.clone() {
            let phase = self.phases[index].as_ref();
            let mut source = ScalarField::zeros(format!("source.{}", phase.name()), n_cells);
            for mass_source in &self.sources {
                if mass_source.applies_to(phase.rho().name()) {
                    let explicit = mass_source
                        .explicit(phase.alpha(), phase.rho())
                        .map_err(|err| err.with_context("source", mass_source.name()))?;
                    source += &explicit;
                }
            }
            if let Some(rate) = dmdts.get(phase.index()) {
                source += rate;
            }
            let phase = self.phases[index].as_mut();
            phase
                .correct_continuity_error(&source)
                .map_err(|err| hook_error(phase.name(), Hook::CorrectContinuityError, err))?;
        }
        Ok(())
    }

    /// Re-reads the configuration.
    ///
    /// An unchanged document is skipped and reported as accepted. Otherwise
    /// each phase re-reads its own section and the result is the conjunction
    /// of their answers. The phase list and the model sections cannot change;
    /// the phase views are reclassified from the re-read flags.
    pub fn read(&mut self, config: PhaseSystemConfig) -> Result<bool, PhaseError> {
        config.validate()?;
        let hash = stable_hash_string(&config)?;
        if hash == self.config_hash {
            debug!("phase properties unchanged");
            return Ok(true);
        }
        if config.phases != self.config.phases {
            return Err(PhaseError::Config(
                ErrorInfo::new("phases-changed", "the phase list cannot change on re-read")
                    .with_hint("construct a new system instead"),
            ));
        }
        let sections = [
            ("blending", config.blending == self.config.blending),
            (SURFACE_TENSION, config.surface_tension == self.config.surface_tension),
            (ASPECT_RATIO, config.aspect_ratio == self.config.aspect_ratio),
        ];
        if let Some((section, _)) = sections.iter().find(|(_, same)| !same) {
            return Err(PhaseError::Config(
                ErrorInfo::new("models-changed", "model sections cannot change on re-read")
                    .with_context("section", *section)
                    .with_hint("construct a new system instead"),
            ));
        }

        let outcome = self.read_phases(&config);
        self.views = Views::classify(&self.phases);
        let read_ok = outcome?;
        info!(
            accepted = read_ok,
            moving = self.views.moving.len(),
            stationary = self.views.stationary.len(),
            hash = %hash,
            "re-read phase properties"
        );
        if self.views.moving.is_empty() {
            warn!("phase system has no moving phases; mixture density and velocity are unavailable");
        }
        self.config = config;
        self.config_hash = hash;
        Ok(read_ok)
    }

    fn read_phases(&mut self, config: &PhaseSystemConfig) -> Result<bool, PhaseError> {
        let mut read_ok = true;
        for phase in self.phases.iter_mut() {
            let spec = config.phase_spec(phase.name())?;
            read_ok &= phase
                .read(spec)
                .map_err(|err| hook_error(phase.name(), Hook::Read, err))?;
        }
        Ok(read_ok)
    }
}

impl std::fmt::Debug for PhaseSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseSystem")
            .field("phases", &self.config.phases)
            .field("pairs", &self.pairs.len())
            .field("surface_tension", &self.surface_tension)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("config_hash", &self.config_hash)
            .finish()
    }
}
