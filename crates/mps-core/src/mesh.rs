//! Minimal finite-volume mesh used for interpolation and patch extraction.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhaseError};
use crate::field::{ScalarField, SurfaceScalarField};

fn mesh_error(code: &str, message: impl Into<String>) -> PhaseError {
    PhaseError::Field(ErrorInfo::new(code, message.into()))
}

/// A face between an owner cell and an optional neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Owner cell index.
    pub owner: usize,
    /// Neighbour cell index, `None` on the boundary.
    pub neighbour: Option<usize>,
    /// Linear interpolation weight applied to the owner value.
    pub weight: f64,
}

/// A named, contiguous range of boundary faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Patch name.
    pub name: String,
    /// Face indices covered by the patch.
    pub faces: Range<usize>,
}

impl Patch {
    /// Number of faces on the patch.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when the patch has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Cell/face connectivity shared by every field of a phase system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    n_cells: usize,
    faces: Vec<Face>,
    patches: Vec<Patch>,
}

impl Mesh {
    /// Validates and assembles a mesh.
    pub fn new(n_cells: usize, faces: Vec<Face>, patches: Vec<Patch>) -> Result<Self, PhaseError> {
        for (idx, face) in faces.iter().enumerate() {
            let neighbour_ok = face.neighbour.map_or(true, |n| n < n_cells);
            if face.owner >= n_cells || !neighbour_ok {
                return Err(PhaseError::Field(
                    ErrorInfo::new("mesh-face", "face references a cell outside the mesh")
                        .with_context("face", idx.to_string()),
                ));
            }
            if !(0.0..=1.0).contains(&face.weight) {
                return Err(mesh_error("mesh-weight", format!("face {idx} weight outside [0,1]")));
            }
        }
        for patch in &patches {
            if patch.faces.start > patch.faces.end || patch.faces.end > faces.len() {
                return Err(PhaseError::Field(
                    ErrorInfo::new("mesh-patch", "patch range is reversed or exceeds face count")
                        .with_context("patch", patch.name.clone()),
                ));
            }
            if faces[patch.faces.clone()].iter().any(|f| f.neighbour.is_some()) {
                return Err(PhaseError::Field(
                    ErrorInfo::new("mesh-patch", "patch covers an internal face")
                        .with_context("patch", patch.name.clone()),
                ));
            }
        }
        Ok(Self {
            n_cells,
            faces,
            patches,
        })
    }

    /// One-dimensional chain of `n_cells` cells with `inlet` and `outlet` patches.
    pub fn line(n_cells: usize) -> Result<Self, PhaseError> {
        if n_cells == 0 {
            return Err(mesh_error("mesh-empty", "a line mesh needs at least one cell"));
        }
        let mut faces: Vec<Face> = (0..n_cells - 1)
            .map(|cell| Face {
                owner: cell,
                neighbour: Some(cell + 1),
                weight: 0.5,
            })
            .collect();
        let internal = faces.len();
        faces.push(Face {
            owner: 0,
            neighbour: None,
            weight: 1.0,
        });
        faces.push(Face {
            owner: n_cells - 1,
            neighbour: None,
            weight: 1.0,
        });
        let patches = vec![
            Patch {
                name: "inlet".into(),
                faces: internal..internal + 1,
            },
            Patch {
                name: "outlet".into(),
                faces: internal + 1..internal + 2,
            },
        ];
        Self::new(n_cells, faces, patches)
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Number of faces, internal and boundary.
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// All faces.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Boundary patches.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Looks up a patch by index.
    pub fn patch(&self, patch: usize) -> Result<&Patch, PhaseError> {
        self.patches.get(patch).ok_or_else(|| {
            PhaseError::Field(
                ErrorInfo::new("mesh-patch-index", "patch index out of range")
                    .with_context("patch", patch.to_string()),
            )
        })
    }

    /// Linear cell-to-face interpolation; boundary faces take the owner value.
    pub fn interpolate(&self, field: &ScalarField) -> SurfaceScalarField {
        let cells = field.values();
        let values = self
            .faces
            .iter()
            .map(|face| match face.neighbour {
                Some(n) => face.weight * cells[face.owner] + (1.0 - face.weight) * cells[n],
                None => cells[face.owner],
            })
            .collect();
        SurfaceScalarField::new(format!("interpolate({})", field.name()), values)
    }

    /// Values of `field` seen by the faces of `patch`.
    pub fn patch_values(&self, field: &ScalarField, patch: usize) -> Result<Vec<f64>, PhaseError> {
        field.check_len(self.n_cells)?;
        let patch = self.patch(patch)?;
        Ok(self.faces[patch.faces.clone()]
            .iter()
            .map(|face| field.values()[face.owner])
            .collect())
    }
}
