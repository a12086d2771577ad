//! Velocity divergence by central differences.
//!
//! ```text
//! div = (u[i+1] - u[i-1]) / 2dx + (v[j+1] - v[j-1]) / 2dy + (w[k+1] - w[k-1]) / 2dz
//! ```
//!
//! An axis term is dropped (treated as zero gradient) when either
//! neighbour along that axis holds no velocity: null padding, or a
//! solid cell. Enforced ghosts count as neighbours.

use eddy_core::{Axis, StepError};
use eddy_grid::{FluidField, FluidMask, Mesh};

use crate::stencil::axis_velocities;

/// Divergence over fluid cells, aligned with the padded grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceField {
    values: Vec<Option<f64>>,
}

/// Summary of a [`DivergenceField`] over its fluid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DivergenceStats {
    /// Largest |∇·u|.
    pub max_abs: f64,
    /// Mean |∇·u|.
    pub mean_abs: f64,
    /// Number of cells summarised.
    pub cells: usize,
}

impl DivergenceField {
    /// Divergence at `idx`; `None` for non-fluid cells.
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    /// The raw array.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Max and mean absolute divergence.
    pub fn stats(&self) -> DivergenceStats {
        let mut stats = DivergenceStats::default();
        let mut sum = 0.0;
        for d in self.values.iter().flatten() {
            let a = d.abs();
            stats.max_abs = stats.max_abs.max(a);
            sum += a;
            stats.cells += 1;
        }
        if stats.cells > 0 {
            stats.mean_abs = sum / stats.cells as f64;
        }
        stats
    }

    /// Poisson right-hand side `div / dt`, zero off the fluid.
    pub fn rhs(&self, dt: f64) -> Vec<f64> {
        self.values
            .iter()
            .map(|d| d.map_or(0.0, |d| d / dt))
            .collect()
    }
}

/// Computes [`DivergenceField`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct DivergenceOperator;

impl DivergenceOperator {
    /// Create the operator.
    pub fn new() -> Self {
        Self
    }

    /// Divergence of `field` over the fluid cells of `mask`.
    pub fn compute(
        &self,
        mesh: &Mesh,
        mask: &FluidMask,
        field: &FluidField,
    ) -> Result<DivergenceField, StepError> {
        field.check_shape(mesh)?;
        let h = mesh.spacing();
        let mut values = vec![None; mesh.len()];

        for idx in mask.fluid_indices() {
            let mut div = 0.0;
            for axis in Axis::ALL {
                let a = axis.index();
                if let (Some(lo), Some(hi)) = axis_velocities(mesh, field, idx, axis) {
                    div += (hi[a] - lo[a]) / (2.0 * h[a]);
                }
            }
            values[idx] = Some(div);
        }

        Ok(DivergenceField { values })
    }
}
