//! Named cell and face fields forming the numeric substrate.

use std::ops::{AddAssign, Mul, Sub};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhaseError};

fn shape_error(name: &str, expected: usize, actual: usize) -> PhaseError {
    PhaseError::Field(
        ErrorInfo::new("field-shape", "field length does not match the mesh")
            .with_context("field", name)
            .with_context("expected", expected.to_string())
            .with_context("actual", actual.to_string()),
    )
}

/// Cell-centred scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    name: String,
    values: Vec<f64>,
    #[serde(default)]
    auto_write: bool,
}

impl ScalarField {
    /// Wraps per-cell values under the given name.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            auto_write: false,
        }
    }

    /// Creates a field holding `value` in every one of `len` cells.
    pub fn uniform(name: impl Into<String>, len: usize, value: f64) -> Self {
        Self::new(name, vec![value; len])
    }

    /// Creates a zero-valued field.
    pub fn zeros(name: impl Into<String>, len: usize) -> Self {
        Self::uniform(name, len, 0.0)
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field renamed.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Per-cell values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable per-cell values.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the host I/O layer should persist this field.
    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    /// Marks the field as persistable (or not).
    pub fn set_auto_write(&mut self, auto_write: bool) {
        self.auto_write = auto_write;
    }

    /// Fails with [`PhaseError::Field`] unless the field has `expected` cells.
    pub fn check_len(&self, expected: usize) -> Result<(), PhaseError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(shape_error(&self.name, expected, self.len()))
        }
    }

    /// Smallest cell value, `None` for an empty field.
    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Largest cell value, `None` for an empty field.
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Applies `f` cellwise, keeping the name.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> ScalarField {
        ScalarField::new(self.name.clone(), self.values.iter().map(|v| f(*v)).collect())
    }

    /// Multiplies every cell by `factor`.
    pub fn scaled(&self, factor: f64) -> ScalarField {
        self.map(|v| v * factor)
    }

    /// Cellwise `self / max(denominator, floor)`.
    pub fn divide_clamped(&self, denominator: &ScalarField, floor: f64) -> ScalarField {
        debug_assert_eq!(self.len(), denominator.len());
        let values = self
            .values
            .iter()
            .zip(&denominator.values)
            .map(|(num, den)| num / den.max(floor))
            .collect();
        ScalarField::new(self.name.clone(), values)
    }
}

impl AddAssign<&ScalarField> for ScalarField {
    fn add_assign(&mut self, rhs: &ScalarField) {
        debug_assert_eq!(self.len(), rhs.len());
        for (lhs, rhs) in self.values.iter_mut().zip(&rhs.values) {
            *lhs += rhs;
        }
    }
}

impl Mul<&ScalarField> for &ScalarField {
    type Output = ScalarField;

    fn mul(self, rhs: &ScalarField) -> ScalarField {
        debug_assert_eq!(self.len(), rhs.len());
        let values = self.values.iter().zip(&rhs.values).map(|(a, b)| a * b).collect();
        ScalarField::new(format!("({}*{})", self.name, rhs.name), values)
    }
}

impl Sub<&ScalarField> for &ScalarField {
    type Output = ScalarField;

    fn sub(self, rhs: &ScalarField) -> ScalarField {
        debug_assert_eq!(self.len(), rhs.len());
        let values = self.values.iter().zip(&rhs.values).map(|(a, b)| a - b).collect();
        ScalarField::new(format!("({}-{})", self.name, rhs.name), values)
    }
}

/// Cell-centred vector field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorField {
    name: String,
    values: Vec<Vector3<f64>>,
    #[serde(default)]
    auto_write: bool,
}

impl VectorField {
    /// Wraps per-cell vectors under the given name.
    pub fn new(name: impl Into<String>, values: Vec<Vector3<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            auto_write: false,
        }
    }

    /// Creates a field holding `value` in every cell.
    pub fn uniform(name: impl Into<String>, len: usize, value: Vector3<f64>) -> Self {
        Self::new(name, vec![value; len])
    }

    /// Creates a zero-valued field.
    pub fn zeros(name: impl Into<String>, len: usize) -> Self {
        Self::uniform(name, len, Vector3::zeros())
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field renamed.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Per-cell vectors.
    pub fn values(&self) -> &[Vector3<f64>] {
        &self.values
    }

    /// Mutable per-cell vectors.
    pub fn values_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fails with [`PhaseError::Field`] unless the field has `expected` cells.
    pub fn check_len(&self, expected: usize) -> Result<(), PhaseError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(shape_error(&self.name, expected, self.len()))
        }
    }

    /// Cellwise `weight * self`.
    pub fn weighted(&self, weight: &ScalarField) -> VectorField {
        debug_assert_eq!(self.len(), weight.len());
        let values = self
            .values
            .iter()
            .zip(weight.values())
            .map(|(u, w)| u * *w)
            .collect();
        VectorField::new(format!("({}*{})", weight.name(), self.name), values)
    }

    /// Cellwise `self / max(denominator, floor)`.
    pub fn divide_clamped(&self, denominator: &ScalarField, floor: f64) -> VectorField {
        debug_assert_eq!(self.len(), denominator.len());
        let values = self
            .values
            .iter()
            .zip(denominator.values())
            .map(|(u, den)| u / den.max(floor))
            .collect();
        VectorField::new(self.name.clone(), values)
    }
}

impl AddAssign<&VectorField> for VectorField {
    fn add_assign(&mut self, rhs: &VectorField) {
        debug_assert_eq!(self.len(), rhs.len());
        for (lhs, rhs) in self.values.iter_mut().zip(&rhs.values) {
            *lhs += rhs;
        }
    }
}

/// Face-centred scalar field, e.g. a volumetric flux.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceScalarField {
    name: String,
    values: Vec<f64>,
    #[serde(default)]
    auto_write: bool,
}

impl SurfaceScalarField {
    /// Wraps per-face values under the given name.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            auto_write: false,
        }
    }

    /// Creates a zero-valued field over `len` faces.
    pub fn zeros(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![0.0; len])
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field renamed.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Per-face values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable per-face values.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the field has no faces.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the host I/O layer should persist this field.
    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    /// Marks the field as persistable (or not).
    pub fn set_auto_write(&mut self, auto_write: bool) {
        self.auto_write = auto_write;
    }

    /// Fails with [`PhaseError::Field`] unless the field has `expected` faces.
    pub fn check_len(&self, expected: usize) -> Result<(), PhaseError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(shape_error(&self.name, expected, self.len()))
        }
    }

    /// Applies `f` facewise, keeping the name.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> SurfaceScalarField {
        SurfaceScalarField::new(self.name.clone(), self.values.iter().map(|v| f(*v)).collect())
    }
}

impl AddAssign<&SurfaceScalarField> for SurfaceScalarField {
    fn add_assign(&mut self, rhs: &SurfaceScalarField) {
        debug_assert_eq!(self.len(), rhs.len());
        for (lhs, rhs) in self.values.iter_mut().zip(&rhs.values) {
            *lhs += rhs;
        }
    }
}

impl Mul<&SurfaceScalarField> for &SurfaceScalarField {
    type Output = SurfaceScalarField;

    fn mul(self, rhs: &SurfaceScalarField) -> SurfaceScalarField {
        debug_assert_eq!(self.len(), rhs.len());
        let values = self.values.iter().zip(&rhs.values).map(|(a, b)| a * b).collect();
        SurfaceScalarField::new(format!("({}*{})", self.name, rhs.name), values)
    }
}
