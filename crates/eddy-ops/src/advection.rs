//! Explicit advection-diffusion predictor.
//!
//! ```text
//! u* = u + Δt · ( −(u·∇)u + ν∇²u )
//! ```
//!
//! The convective derivative along each axis is either central
//!
//! ```text
//! ∂u/∂x ≈ (u[i+1] − u[i-1]) / 2dx
//! ```
//!
//! or first-order upwind, picking the backward difference where the
//! advecting component is non-negative and the forward one otherwise.
//! Diffusion uses the 7-point Laplacian. A neighbour without a velocity
//! (null padding, solid) stands in with the centre value, so uniform
//! fields are left exactly unchanged.

use eddy_core::{
    AdvectionScheme, Axis, CellDiagnostics, ConfigError, MutationSource, SolverConfig, StepError,
};
use eddy_grid::{FluidField, FluidMask, Mesh};

use crate::stencil::axis_velocities;

/// Computes the tentative velocity u*.
#[derive(Clone, Debug)]
pub struct AdvectionDiffusionStepper {
    dt: f64,
    viscosity: f64,
    scheme: AdvectionScheme,
}

/// Builder for [`AdvectionDiffusionStepper`].
pub struct AdvectionDiffusionStepperBuilder {
    dt: Option<f64>,
    viscosity: f64,
    scheme: AdvectionScheme,
}

impl AdvectionDiffusionStepper {
    /// Create a new builder.
    pub fn builder() -> AdvectionDiffusionStepperBuilder {
        AdvectionDiffusionStepperBuilder {
            dt: None,
            viscosity: 0.0,
            scheme: AdvectionScheme::Upwind,
        }
    }

    /// Build from solver configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigError> {
        Self::builder()
            .dt(config.dt)
            .viscosity(config.viscosity)
            .scheme(config.advection)
            .build()
    }

    /// The timestep.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Predict u* from `field`. Pressure is carried over unchanged.
    pub fn step(
        &self,
        mesh: &Mesh,
        mask: &FluidMask,
        field: &FluidField,
        diagnostics: &mut CellDiagnostics,
    ) -> Result<FluidField, StepError> {
        field.check_shape(mesh)?;
        let h = mesh.spacing();
        let mut next = field.clone();

        for idx in mask.fluid_indices() {
            let u = field
                .velocity(idx)
                .ok_or(StepError::UndefinedFluidCell { cell: idx })?;
            let mut advect = [0.0; 3];
            let mut lap = [0.0; 3];

            for axis in Axis::ALL {
                let a = axis.index();
                let (lo, hi) = axis_velocities(mesh, field, idx, axis);
                let lo = lo.unwrap_or(u);
                let hi = hi.unwrap_or(u);
                let carrier = u[a];
                for c in 0..3 {
                    let d = match self.scheme {
                        AdvectionScheme::Central => (hi[c] - lo[c]) / (2.0 * h[a]),
                        AdvectionScheme::Upwind if carrier >= 0.0 => (u[c] - lo[c]) / h[a],
                        AdvectionScheme::Upwind => (hi[c] - u[c]) / h[a],
                    };
                    advect[c] += carrier * d;
                    lap[c] += (hi[c] + lo[c] - 2.0 * u[c]) / (h[a] * h[a]);
                }
            }

            let mut star = u;
            for c in 0..3 {
                star[c] += self.dt * (self.viscosity * lap[c] - advect[c]);
            }
            if star != u {
                diagnostics.record(idx, MutationSource::AdvectionDiffusion);
            }
            next.set_velocity(idx, Some(star));
        }

        Ok(next)
    }

    /// Largest explicitly stable timestep for `field`.
    ///
    /// The minimum of the advective limit `1 / max Σ|u_a|/h_a` and the
    /// diffusive limit `1 / (2ν Σ 1/h_a²)`. `None` when neither applies
    /// (still, inviscid fluid).
    pub fn max_stable_dt(&self, mesh: &Mesh, mask: &FluidMask, field: &FluidField) -> Option<f64> {
        let h = mesh.spacing();
        let rate = mask
            .fluid_indices()
            .filter_map(|idx| field.velocity(idx))
            .map(|u| (0..3).map(|a| u[a].abs() / h[a]).sum::<f64>())
            .fold(0.0f64, f64::max);
        let advective = (rate > 0.0).then(|| 1.0 / rate);

        let inv_h2: f64 = h.iter().map(|h| 1.0 / (h * h)).sum();
        let diffusive = (self.viscosity > 0.0).then(|| 1.0 / (2.0 * self.viscosity * inv_h2));

        match (advective, diffusive) {
            (Some(a), Some(d)) => Some(a.min(d)),
            (a, d) => a.or(d),
        }
    }

    /// Courant number `Δt · max Σ|u_a|/h_a` over fluid cells.
    pub fn cfl(&self, mesh: &Mesh, mask: &FluidMask, field: &FluidField) -> f64 {
        let h = mesh.spacing();
        mask.fluid_indices()
            .filter_map(|idx| field.velocity(idx))
            .map(|u| self.dt * (0..3).map(|a| u[a].abs() / h[a]).sum::<f64>())
            .fold(0.0, f64::max)
    }
}

impl AdvectionDiffusionStepperBuilder {
    /// Set the timestep Δt (required). Must be finite and > 0.
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the kinematic viscosity ν (default: 0.0). Must be finite and >= 0.
    pub fn viscosity(mut self, viscosity: f64) -> Self {
        self.viscosity = viscosity;
        self
    }

    /// Set the advection scheme (default: upwind).
    pub fn scheme(mut self, scheme: AdvectionScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Build the stepper.
    pub fn build(self) -> Result<AdvectionDiffusionStepper, ConfigError> {
        let dt = self.dt.ok_or_else(|| ConfigError::InvalidParameter {
            name: "dt".to_string(),
            reason: "is required".to_string(),
        })?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "dt".to_string(),
                reason: format!("must be finite and > 0, got {dt}"),
            });
        }
        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "viscosity".to_string(),
                reason: format!("must be finite and >= 0, got {}", self.viscosity),
            });
        }
        Ok(AdvectionDiffusionStepper {
            dt,
            viscosity: self.viscosity,
            scheme: self.scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_grid::{Domain, GridTopology};

    fn setup(n: [usize; 3]) -> (GridTopology, FluidMask) {
        let t = GridTopology::new(Domain::unit_cells(n).unwrap());
        let mask = FluidMask::all_fluid(t.mesh());
        (t, mask)
    }

    fn stepper(scheme: AdvectionScheme, viscosity: f64) -> AdvectionDiffusionStepper {
        AdvectionDiffusionStepper::builder()
            .dt(0.01)
            .viscosity(viscosity)
            .scheme(scheme)
            .build()
            .unwrap()
    }

    // ----------------------------------------------------------------
    // Invariance
    // ----------------------------------------------------------------

    #[test]
    fn uniform_field_is_invariant() {
        let (t, mask) = setup([4, 3, 5]);
        let m = t.mesh();
        let field = FluidField::initialize(&mask, [1.5, -0.25, 3.0], 2.0);
        for scheme in [AdvectionScheme::Central, AdvectionScheme::Upwind] {
            let mut diag = CellDiagnostics::new(m.len());
            let out = stepper(scheme, 0.3).step(m, &mask, &field, &mut diag).unwrap();
            assert_eq!(out, field, "{scheme:?} changed a uniform field");
            assert!(mask.fluid_indices().all(|c| diag.mutation_source(c).is_none()));
        }
    }

    #[test]
    fn solids_do_not_break_uniform_invariance() {
        let (t, _) = setup([4, 4, 4]);
        let m = t.mesh();
        let mask = FluidMask::from_fn(m, |i, j, k| (i + j + k) % 3 != 0);
        let field = FluidField::initialize(&mask, [0.2, 0.2, -0.7], 0.0);
        let mut diag = CellDiagnostics::new(m.len());
        let out = stepper(AdvectionScheme::Upwind, 1.0)
            .step(m, &mask, &field, &mut diag)
            .unwrap();
        assert_eq!(out, field);
    }

    // ----------------------------------------------------------------
    // Transport and diffusion
    // ----------------------------------------------------------------

    #[test]
    fn upwind_uses_backward_difference_for_positive_flow() {
        // u = (1 + 0.1 x, 0, 0): (u·∇)u_x = u · 0.1 with the upwind
        // (backward) difference, exact for a linear profile.
        let (t, mask) = setup([5, 1, 1]);
        let m = t.mesh();
        let field = FluidField::from_fn(&t, &mask, |[x, _, _]| ([1.0 + 0.1 * x, 0.0, 0.0], 0.0));
        let mut diag = CellDiagnostics::new(m.len());
        let out = stepper(AdvectionScheme::Upwind, 0.0)
            .step(m, &mask, &field, &mut diag)
            .unwrap();
        let idx = m.index(3, 1, 1);
        let u0 = field.velocity(idx).unwrap()[0];
        let u1 = out.velocity(idx).unwrap()[0];
        assert!((u1 - (u0 - 0.01 * u0 * 0.1)).abs() < 1e-12, "u1 = {u1}");
        assert_eq!(diag.mutation_source(idx), Some(MutationSource::AdvectionDiffusion));
    }

    #[test]
    fn upwind_uses_forward_difference_for_negative_flow() {
        // A step profile: only the forward neighbour differs.
        let (t, mask) = setup([3, 1, 1]);
        let m = t.mesh();
        let field = FluidField::from_fn(&t, &mask, |[x, _, _]| {
            ([if x > 2.0 { -2.0 } else { -1.0 }, 0.0, 0.0], 0.0)
        });
        let mut diag = CellDiagnostics::new(m.len());
        let out = stepper(AdvectionScheme::Upwind, 0.0)
            .step(m, &mask, &field, &mut diag)
            .unwrap();
        // Middle cell: u = -1, forward difference (-2 - -1)/1 = -1,
        // u* = -1 - 0.01 * (-1 * -1) = -1.01.
        let mid = out.velocity(m.index(2, 1, 1)).unwrap()[0];
        assert!((mid + 1.01).abs() < 1e-12, "mid = {mid}");
        // First cell looks forward to the middle one: unchanged.
        assert_eq!(out.velocity(m.index(1, 1, 1)), field.velocity(m.index(1, 1, 1)));
    }

    #[test]
    fn diffusion_smooths_a_spike() {
        let (t, mask) = setup([5, 5, 5]);
        let m = t.mesh();
        let mut field = FluidField::initialize(&mask, [0.0; 3], 0.0);
        let centre = m.index(3, 3, 3);
        field.set_velocity(centre, Some([0.0, 0.0, 1.0]));
        let mut diag = CellDiagnostics::new(m.len());
        let out = stepper(AdvectionScheme::Central, 1.0)
            .step(m, &mask, &field, &mut diag)
            .unwrap();
        // Stationary spike: advection vanishes except through the spike
        // itself (w·∂w/∂z is zero by symmetry of the central difference).
        let w = out.velocity(centre).unwrap()[2];
        assert!((w - (1.0 - 0.01 * 6.0)).abs() < 1e-12, "w = {w}");
        let neighbour = out.velocity(m.index(3, 3, 4)).unwrap()[2];
        assert!(neighbour > 0.0);
    }

    // ----------------------------------------------------------------
    // Stability limits
    // ----------------------------------------------------------------

    #[test]
    fn stable_dt_takes_tighter_limit() {
        let (t, mask) = setup([4, 4, 4]);
        let m = t.mesh();
        let field = FluidField::initialize(&mask, [2.0, 0.0, 0.0], 0.0);
        let s = stepper(AdvectionScheme::Upwind, 0.1);
        // advective 1/2, diffusive 1/(2·0.1·3) = 1.666…
        let dt = s.max_stable_dt(m, &mask, &field).unwrap();
        assert!((dt - 0.5).abs() < 1e-12);
        assert!((s.cfl(m, &mask, &field) - 0.02).abs() < 1e-12);

        let still = FluidField::initialize(&mask, [0.0; 3], 0.0);
        assert_eq!(stepper(AdvectionScheme::Upwind, 0.0).max_stable_dt(m, &mask, &still), None);
    }

    #[test]
    fn builder_validates() {
        assert!(AdvectionDiffusionStepper::builder().build().is_err());
        assert!(AdvectionDiffusionStepper::builder().dt(-1.0).build().is_err());
        assert!(AdvectionDiffusionStepper::builder()
            .dt(0.1)
            .viscosity(-0.5)
            .build()
            .is_err());
    }
}
