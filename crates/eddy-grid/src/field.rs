//! Velocity and pressure storage.
//!
//! `None` marks a null cell. Fluid cells always hold values; non-fluid
//! cells stay null unless a boundary condition writes them.

use eddy_core::StepError;

use crate::mask::FluidMask;
use crate::mesh::Mesh;
use crate::topology::GridTopology;

/// Dense velocity and pressure arrays over the padded grid.
///
/// `Clone` is a deep copy: snapshots never alias the live state.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidField {
    velocity: Vec<Option<[f64; 3]>>,
    pressure: Vec<Option<f64>>,
}

impl FluidField {
    /// All cells null.
    pub fn empty(len: usize) -> Self {
        Self {
            velocity: vec![None; len],
            pressure: vec![None; len],
        }
    }

    /// Uniform initial conditions on fluid cells; everything else null.
    pub fn initialize(mask: &FluidMask, velocity: [f64; 3], pressure: f64) -> Self {
        let mut field = Self::empty(mask.len());
        for idx in mask.fluid_indices() {
            field.velocity[idx] = Some(velocity);
            field.pressure[idx] = Some(pressure);
        }
        field
    }

    /// Initial conditions as a function of cell-centre position.
    pub fn from_fn(
        topology: &GridTopology,
        mask: &FluidMask,
        mut init: impl FnMut([f64; 3]) -> ([f64; 3], f64),
    ) -> Self {
        let mut field = Self::empty(mask.len());
        for idx in mask.fluid_indices() {
            let (u, p) = init(topology.cell_center(idx));
            field.velocity[idx] = Some(u);
            field.pressure[idx] = Some(p);
        }
        field
    }

    /// Padded length.
    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    /// Whether the field covers no cells.
    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    /// Velocity at `idx`.
    #[inline]
    pub fn velocity(&self, idx: usize) -> Option<[f64; 3]> {
        self.velocity.get(idx).copied().flatten()
    }

    /// Pressure at `idx`.
    #[inline]
    pub fn pressure(&self, idx: usize) -> Option<f64> {
        self.pressure.get(idx).copied().flatten()
    }

    /// Overwrite the velocity at `idx`.
    pub fn set_velocity(&mut self, idx: usize, value: Option<[f64; 3]>) {
        if let Some(slot) = self.velocity.get_mut(idx) {
            *slot = value;
        }
    }

    /// Overwrite the pressure at `idx`.
    pub fn set_pressure(&mut self, idx: usize, value: Option<f64>) {
        if let Some(slot) = self.pressure.get_mut(idx) {
            *slot = value;
        }
    }

    /// The velocity array.
    pub fn velocities(&self) -> &[Option<[f64; 3]>] {
        &self.velocity
    }

    /// The pressure array.
    pub fn pressures(&self) -> &[Option<f64>] {
        &self.pressure
    }

    /// Fail unless both arrays match the mesh.
    pub fn check_shape(&self, mesh: &Mesh) -> Result<(), StepError> {
        mesh.check_len("velocity", self.velocity.len())?;
        mesh.check_len("pressure", self.pressure.len())
    }

    /// Fail if any fluid cell is null.
    pub fn check_defined(&self, mask: &FluidMask) -> Result<(), StepError> {
        match mask
            .fluid_indices()
            .find(|&idx| self.velocity(idx).is_none() || self.pressure(idx).is_none())
        {
            Some(cell) => Err(StepError::UndefinedFluidCell { cell }),
            None => Ok(()),
        }
    }

    /// Reset non-finite fluid values to zero.
    ///
    /// Returns the indices of the cells that were touched.
    pub fn sanitize(&mut self, mask: &FluidMask) -> Vec<usize> {
        let mut touched = Vec::new();
        for idx in mask.fluid_indices() {
            let mut dirty = false;
            if let Some(u) = self.velocity[idx].as_mut() {
                for c in u.iter_mut() {
                    if !c.is_finite() {
                        *c = 0.0;
                        dirty = true;
                    }
                }
            }
            if let Some(p) = self.pressure[idx].as_mut() {
                if !p.is_finite() {
                    *p = 0.0;
                    dirty = true;
                }
            }
            if dirty {
                touched.push(idx);
            }
        }
        touched
    }

    /// `0.5 * Σ |u|²` over fluid cells (unit density).
    pub fn kinetic_energy(&self, mask: &FluidMask) -> f64 {
        mask.fluid_indices()
            .filter_map(|idx| self.velocity(idx))
            .map(|u| 0.5 * (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]))
            .sum()
    }
}
