//! Structured error types shared across the multiphase crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PhaseError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (phase, pair, effect, hook, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for phase system construction and correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PhaseError {
    /// A pair or configuration entry names a phase the system does not own.
    #[error("unknown phase: {0}")]
    UnknownPhase(ErrorInfo),
    /// A blending type or blending method name has no implementation.
    #[error("unknown blending method: {0}")]
    UnknownBlendingMethod(ErrorInfo),
    /// A model type name has no registered constructor.
    #[error("unknown model type: {0}")]
    UnknownModelType(ErrorInfo),
    /// Two entries target the same pair for the same effect.
    #[error("duplicate model: {0}")]
    DuplicateModel(ErrorInfo),
    /// Malformed or incomplete configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Field shape or substrate errors.
    #[error("field error: {0}")]
    Field(ErrorInfo),
    /// A per-phase lifecycle hook failed.
    #[error("hook error: {0}")]
    Hook(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PhaseError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PhaseError::UnknownPhase(info)
            | PhaseError::UnknownBlendingMethod(info)
            | PhaseError::UnknownModelType(info)
            | PhaseError::DuplicateModel(info)
            | PhaseError::Config(info)
            | PhaseError::Field(info)
            | PhaseError::Hook(info)
            | PhaseError::Serde(info) => info,
        }
    }

    /// Returns a mutable reference to the payload.
    pub fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            PhaseError::UnknownPhase(info)
            | PhaseError::UnknownBlendingMethod(info)
            | PhaseError::UnknownModelType(info)
            | PhaseError::DuplicateModel(info)
            | PhaseError::Config(info)
            | PhaseError::Field(info)
            | PhaseError::Hook(info)
            | PhaseError::Serde(info) => info,
        }
    }

    /// Adds a context entry without overwriting an existing one.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut()
            .context
            .entry(key.into())
            .or_insert_with(|| value.into());
        self
    }

    /// Builds an [`PhaseError::UnknownPhase`] naming the missing phase.
    pub fn unknown_phase(name: &str) -> Self {
        PhaseError::UnknownPhase(
            ErrorInfo::new("unknown-phase", format!("phase {name} is not in the phase list"))
                .with_context("phase", name),
        )
    }
}
