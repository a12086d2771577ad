//! Velocity projection and pressure update.
//!
//! ```text
//! u_new = u* − (Δt/ρ)·∇φ
//! p_new = p + ρ·φ
//! ```
//!
//! `∇φ` is the central difference of the potential. Only interior fluid
//! cells change; ghosts and solids pass through untouched and are
//! refreshed afterwards by boundary enforcement.

use eddy_core::{CellDiagnostics, ConfigError, MutationSource, SolverConfig, StepError};
use eddy_grid::{FluidField, FluidMask, Mesh};

use crate::divergence::{DivergenceField, DivergenceOperator};
use crate::stencil::{central_gradient, clamp_finite};

/// Result of a pressure correction.
#[derive(Clone, Debug)]
pub struct Correction {
    /// Corrected velocity and pressure.
    pub field: FluidField,
    /// Divergence of the corrected velocity, before re-enforcement.
    pub divergence: DivergenceField,
    /// Fluid cells updated.
    pub cells_corrected: usize,
    /// Potential values that were non-finite and clamped first.
    pub clamped: usize,
}

/// Applies the pressure-correction potential.
#[derive(Clone, Debug)]
pub struct PressureCorrector {
    dt: f64,
    density: f64,
}

/// Builder for [`PressureCorrector`].
pub struct PressureCorrectorBuilder {
    dt: Option<f64>,
    density: f64,
}

impl PressureCorrector {
    /// Create a new builder.
    pub fn builder() -> PressureCorrectorBuilder {
        PressureCorrectorBuilder {
            dt: None,
            density: 1.0,
        }
    }

    /// Build from solver configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigError> {
        Self::builder().dt(config.dt).density(config.density).build()
    }

    /// Project `tentative` with potential `phi`.
    ///
    /// Returns a new field; the input is left as the pre-correction
    /// snapshot.
    pub fn correct(
        &self,
        mesh: &Mesh,
        mask: &FluidMask,
        tentative: &FluidField,
        phi: &[f64],
        diagnostics: &mut CellDiagnostics,
    ) -> Result<Correction, StepError> {
        tentative.check_shape(mesh)?;
        mesh.check_len("phi", phi.len())?;

        let mut clamped = 0usize;
        let phi: Vec<f64> = phi
            .iter()
            .map(|&v| {
                let (v, hit) = clamp_finite(v);
                clamped += usize::from(hit);
                v
            })
            .collect();
        if clamped > 0 {
            log::warn!("clamped {clamped} non-finite potential values before correction");
        }

        let scale = self.dt / self.density;
        let mut field = tentative.clone();
        let mut cells_corrected = 0usize;

        for idx in mask.fluid_indices() {
            let (Some(u), Some(p)) = (tentative.velocity(idx), tentative.pressure(idx)) else {
                return Err(StepError::UndefinedFluidCell { cell: idx });
            };
            let g = central_gradient(mesh, &phi, idx);
            field.set_velocity(
                idx,
                Some([u[0] - scale * g[0], u[1] - scale * g[1], u[2] - scale * g[2]]),
            );
            field.set_pressure(idx, Some(p + self.density * phi[idx]));
            diagnostics.record(idx, MutationSource::PressureCorrection);
            cells_corrected += 1;
        }

        let divergence = DivergenceOperator::new().compute(mesh, mask, &field)?;
        Ok(Correction {
            field,
            divergence,
            cells_corrected,
            clamped,
        })
    }
}

impl PressureCorrectorBuilder {
    /// Set the timestep Δt (required). Must be finite and > 0.
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the density ρ (default: 1.0). Must be finite and > 0.
    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Build the corrector.
    pub fn build(self) -> Result<PressureCorrector, ConfigError> {
        let dt = self.dt.ok_or_else(|| ConfigError::InvalidParameter {
            name: "dt".to_string(),
            reason: "is required".to_string(),
        })?;
        for (name, v) in [("dt", dt), ("density", self.density)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("must be finite and > 0, got {v}"),
                });
            }
        }
        Ok(PressureCorrector {
            dt,
            density: self.density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_grid::{Domain, GridTopology};

    fn setup(n: [usize; 3]) -> (GridTopology, FluidMask) {
        let t = GridTopology::new(Domain::new([-1.0; 3], [1.0; 3], n).unwrap());
        let mask = FluidMask::all_fluid(t.mesh());
        (t, mask)
    }

    #[test]
    fn zero_potential_is_identity() {
        let (t, mask) = setup([4, 4, 4]);
        let m = t.mesh();
        let field = FluidField::from_fn(&t, &mask, |[x, y, z]| ([-y, x, z], x));
        let phi = vec![0.0; m.len()];
        let mut diag = CellDiagnostics::new(m.len());
        let out = PressureCorrector::builder()
            .dt(0.1)
            .build()
            .unwrap()
            .correct(m, &mask, &field, &phi, &mut diag)
            .unwrap();
        assert_eq!(out.field, field);
        assert_eq!(out.cells_corrected, 64);
    }

    #[test]
    fn linear_potential_shifts_velocity_and_pressure() {
        let (t, mask) = setup([4, 4, 4]);
        let m = t.mesh();
        let field = FluidField::initialize(&mask, [1.0, 0.0, 0.0], 10.0);
        // φ = 2x everywhere, including the padding layer.
        let phi: Vec<f64> = (0..m.len()).map(|c| 2.0 * t.cell_center(c)[0]).collect();
        let mut diag = CellDiagnostics::new(m.len());
        let out = PressureCorrector::builder()
            .dt(0.5)
            .density(2.0)
            .build()
            .unwrap()
            .correct(m, &mask, &field, &phi, &mut diag)
            .unwrap();
        let idx = m.index(2, 3, 1);
        let u = out.field.velocity(idx).unwrap();
        // u − (0.5/2)·2 = 0.5
        assert!((u[0] - 0.5).abs() < 1e-12, "u = {u:?}");
        assert!(u[1].abs() < 1e-12 && u[2].abs() < 1e-12);
        let p = out.field.pressure(idx).unwrap();
        assert!((p - (10.0 + 2.0 * phi[idx])).abs() < 1e-12);
        assert_eq!(diag.mutation_source(idx), Some(MutationSource::PressureCorrection));
    }

    #[test]
    fn non_fluid_cells_pass_through() {
        let (t, _) = setup([3, 3, 3]);
        let m = t.mesh();
        let mask = FluidMask::from_fn(m, |i, _, _| i > 0);
        let mut field = FluidField::initialize(&mask, [1.0; 3], 0.0);
        let ghost = m.index(0, 2, 2);
        field.set_velocity(ghost, Some([7.0, 7.0, 7.0]));
        let phi: Vec<f64> = (0..m.len()).map(|c| c as f64 * 0.01).collect();
        let mut diag = CellDiagnostics::new(m.len());
        let out = PressureCorrector::builder()
            .dt(1.0)
            .build()
            .unwrap()
            .correct(m, &mask, &field, &phi, &mut diag)
            .unwrap();
        assert_eq!(out.field.velocity(ghost), Some([7.0, 7.0, 7.0]));
        assert_eq!(out.field.velocity(m.index(1, 2, 2)), None);
        assert_eq!(out.field.len(), field.len());
        assert_eq!(out.cells_corrected, 18);
    }

    #[test]
    fn non_finite_potential_is_clamped() {
        let (t, mask) = setup([2, 2, 2]);
        let m = t.mesh();
        let field = FluidField::initialize(&mask, [0.0; 3], 0.0);
        let mut phi = vec![0.0; m.len()];
        phi[m.index(1, 1, 1)] = f64::NAN;
        let mut diag = CellDiagnostics::new(m.len());
        let out = PressureCorrector::builder()
            .dt(0.1)
            .build()
            .unwrap()
            .correct(m, &mask, &field, &phi, &mut diag)
            .unwrap();
        assert_eq!(out.clamped, 1);
        assert!(out.field.pressures().iter().flatten().all(|p| p.is_finite()));
    }

    #[test]
    fn builder_requires_dt() {
        assert!(PressureCorrector::builder().build().is_err());
        assert!(PressureCorrector::builder().dt(0.1).density(0.0).build().is_err());
    }
}
