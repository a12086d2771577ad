//! Fluid/non-fluid classification.
//!
//! The padding layer is never fluid. Interior cells are fluid unless a
//! geometry mask or predicate marks them solid.

use eddy_core::ConfigError;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// Flattening order of an externally supplied geometry mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlatteningOrder {
    /// `i` fastest: `flat = i + j*nx + k*nx*ny`.
    #[default]
    XMajor,
    /// `j` fastest: `flat = j + i*ny + k*nx*ny`.
    YMajor,
    /// `k` fastest: `flat = k + i*nz + j*nx*nz`.
    ZMajor,
}

impl FlatteningOrder {
    /// Position of interior cell `(i, j, k)` (zero-based) in a flat mask.
    pub fn flat_index(self, [i, j, k]: [usize; 3], [nx, ny, nz]: [usize; 3]) -> usize {
        match self {
            Self::XMajor => i + j * nx + k * nx * ny,
            Self::YMajor => j + i * ny + k * nx * ny,
            Self::ZMajor => k + i * nz + j * nx * nz,
        }
    }
}

/// A flattened integer geometry mask with its encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryMask {
    /// One code per interior cell.
    pub values: Vec<i64>,
    /// Interior shape the mask was flattened from.
    pub shape: [usize; 3],
    /// Code meaning "fluid". Every other code is solid.
    pub fluid_code: i64,
    /// How `values` was flattened.
    pub order: FlatteningOrder,
}

/// Per-cell fluid flag over the padded grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FluidMask {
    cells: Vec<bool>,
}

impl FluidMask {
    /// Every interior cell fluid.
    pub fn all_fluid(mesh: &Mesh) -> Self {
        Self::from_fn(mesh, |_, _, _| true)
    }

    /// Interior cell `(i, j, k)` (zero-based) is fluid iff `is_fluid` says so.
    pub fn from_fn(mesh: &Mesh, mut is_fluid: impl FnMut(usize, usize, usize) -> bool) -> Self {
        let mut cells = vec![false; mesh.len()];
        for idx in mesh.interior_indices() {
            let [i, j, k] = mesh.coords(idx);
            cells[idx] = is_fluid(i - 1, j - 1, k - 1);
        }
        Self { cells }
    }

    /// Decode a flattened geometry mask.
    ///
    /// Fails with [`ConfigError::GeometryMismatch`] when the mask's
    /// length or shape disagrees with the mesh.
    pub fn from_geometry(mesh: &Mesh, geometry: &GeometryMask) -> Result<Self, ConfigError> {
        let shape = mesh.interior_shape();
        let expected = mesh.interior_len();
        if geometry.shape != shape || geometry.values.len() != expected {
            return Err(ConfigError::GeometryMismatch {
                expected,
                actual: geometry.values.len(),
            });
        }
        Ok(Self::from_fn(mesh, |i, j, k| {
            let flat = geometry.order.flat_index([i, j, k], shape);
            geometry.values[flat] == geometry.fluid_code
        }))
    }

    /// Whether `idx` is fluid. Out-of-range indices are not.
    #[inline]
    pub fn is_fluid(&self, idx: usize) -> bool {
        self.cells.get(idx).copied().unwrap_or(false)
    }

    /// Padded length.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the mask covers no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of fluid cells.
    pub fn fluid_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }

    /// Fluid flat indices in ascending order.
    pub fn fluid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, &fluid)| fluid.then_some(idx))
    }
}
