use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::ops::Deref;
use std::path::Path;

use indexmap::IndexMap;
use mps_core::{ErrorInfo, ModelSpec, PhaseError};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{ASPECT_RATIO, SURFACE_TENSION};
use crate::serde::from_yaml_slice;

fn config_error(code: &str, message: impl Into<String>) -> PhaseError {
    PhaseError::Config(ErrorInfo::new(code, message.into()))
}

/// Ordered configuration section of typed entries.
///
/// Keys repeated in the source document are kept aside so validation can
/// report them; a plain map would silently keep only the last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSection {
    entries: IndexMap<String, ModelSpec>,
    repeated: Vec<String>,
}

impl ModelSection {
    /// Keys that appeared more than once, in document order.
    pub fn repeated_keys(&self) -> &[String] {
        &self.repeated
    }

    /// Adds an entry, remembering `key` if it is already present.
    pub fn insert(&mut self, key: impl Into<String>, spec: ModelSpec) {
        let key = key.into();
        if self.entries.contains_key(&key) {
            self.repeated.push(key);
        } else {
            self.entries.insert(key, spec);
        }
    }
}

impl Deref for ModelSection {
    type Target = IndexMap<String, ModelSpec>;

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl FromIterator<(String, ModelSpec)> for ModelSection {
    fn from_iter<I: IntoIterator<Item = (String, ModelSpec)>>(iter: I) -> Self {
        let mut section = Self::default();
        for (key, spec) in iter {
            section.insert(key, spec);
        }
        section
    }
}

impl Serialize for ModelSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModelSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = ModelSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of typed model entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut section = ModelSection::default();
                while let Some((key, spec)) = map.next_entry::<String, ModelSpec>()? {
                    section.insert(key, spec);
                }
                Ok(section)
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

/// Phase properties document driving system construction.
///
/// ```yaml
/// phases: [water, air]
/// water: { type: uniform, alpha: 0.7, rho: 1000.0 }
/// air: { type: uniform, alpha: 0.3, rho: 1.2 }
/// surfaceTension:
///   air and water: { type: constant, sigma: 0.07 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSystemConfig {
    /// Phase names; the order fixes phase indices and iteration order.
    pub phases: Vec<String>,
    /// Named blending methods.
    #[serde(default)]
    pub blending: ModelSection,
    /// Surface tension models keyed by pair specification.
    #[serde(default, rename = "surfaceTension")]
    pub surface_tension: ModelSection,
    /// Aspect ratio models keyed by pair specification.
    #[serde(default, rename = "aspectRatio")]
    pub aspect_ratio: ModelSection,
    /// Per-phase sections, keyed by phase name.
    #[serde(flatten)]
    pub phase_specs: BTreeMap<String, ModelSpec>,
}

impl PhaseSystemConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PhaseError> {
        from_yaml_slice(yaml.as_bytes())
    }

    /// Checks the phase list is non-empty, free of duplicates and fully
    /// described, and that no section repeats a key.
    pub fn validate(&self) -> Result<(), PhaseError> {
        if let Some(name) = self.blending.repeated_keys().first() {
            return Err(PhaseError::Config(
                ErrorInfo::new("blending-duplicate", "blending method defined more than once")
                    .with_context("blending", name.clone()),
            ));
        }
        for (effect, section) in [
            (SURFACE_TENSION, &self.surface_tension),
            (ASPECT_RATIO, &self.aspect_ratio),
        ] {
            if let Some(pair) = section.repeated_keys().first() {
                return Err(PhaseError::DuplicateModel(
                    ErrorInfo::new("duplicate-model", "pair entry repeated in section")
                        .with_context("effect", effect)
                        .with_context("pair", pair.clone()),
                ));
            }
        }
        if self.phases.is_empty() {
            return Err(config_error("phases-empty", "phase list is empty"));
        }
        let mut seen = BTreeSet::new();
        for name in &self.phases {
            if !seen.insert(name.as_str()) {
                return Err(PhaseError::Config(
                    ErrorInfo::new("phases-duplicate", "phase listed more than once")
                        .with_context("phase", name.clone()),
                ));
            }
            self.phase_spec(name)?;
        }
        Ok(())
    }

    /// Section describing the phase called `name`.
    pub fn phase_spec(&self, name: &str) -> Result<&ModelSpec, PhaseError> {
        self.phase_specs.get(name).ok_or_else(|| {
            PhaseError::Config(
                ErrorInfo::new("phase-section", "no configuration section for phase")
                    .with_context("phase", name),
            )
        })
    }
}

/// Loads a phase properties document from disk.
pub fn load_config(path: &Path) -> Result<PhaseSystemConfig, PhaseError> {
    let bytes = fs::read(path).map_err(|err| {
        PhaseError::Config(
            ErrorInfo::new("config-read", "failed to read phase properties")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    from_yaml_slice(&bytes).map_err(|err| err.with_context("path", path.display().to_string()))
}
