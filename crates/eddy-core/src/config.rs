//! Solver tuning parameters.
//!
//! [`SolverConfig`] is passed explicitly to every operator. Defaults
//! live here and nowhere else; solver kernels never hardcode them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Enums ──────────────────────────────────────────────────────────

/// How much the solver reports through the `log` facade.
///
/// Gates the chattier `debug`/`trace` output on top of whatever level
/// filter the host logger applies. Warnings are always emitted.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Warnings only.
    Quiet,
    /// Per-step summaries.
    #[default]
    Normal,
    /// Per-phase timings and ghost construction detail.
    Verbose,
    /// Per-iteration Poisson residuals.
    Trace,
}

/// Sweep ordering for the Poisson relaxation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relaxation {
    /// Lexicographic successive over-relaxation (in place).
    #[default]
    Sor,
    /// Unweighted Jacobi with two buffers. Ignores `omega`.
    Jacobi,
    /// SOR over a red-black colouring of the grid.
    RedBlack,
    /// Geometric multigrid V-cycles smoothed by red-black Gauss-Seidel.
    /// Each cycle counts as one iteration. Ignores `omega`.
    Multigrid {
        /// Grids in the hierarchy, the finest included.
        levels: usize,
        /// Smoothing sweeps before restriction.
        pre_smooth: usize,
        /// Smoothing sweeps after prolongation.
        post_smooth: usize,
    },
}

impl Relaxation {
    /// Three-level V(2,2) multigrid.
    pub const MULTIGRID: Relaxation = Relaxation::Multigrid {
        levels: 3,
        pre_smooth: 2,
        post_smooth: 2,
    };

    /// Check the ordering's own parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Relaxation::Multigrid {
            levels,
            pre_smooth,
            post_smooth,
        } = *self
        {
            if levels == 0 {
                return Err(invalid("levels", "must be at least 1".to_string()));
            }
            if pre_smooth + post_smooth == 0 {
                return Err(invalid(
                    "pre_smooth",
                    "multigrid needs at least one smoothing sweep".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Discretisation of the convective term `(u·∇)u`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvectionScheme {
    /// Second-order central difference.
    Central,
    /// First-order upwind, direction chosen by the local velocity sign.
    #[default]
    Upwind,
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Numeric parameters for one solver step.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Timestep Δt. Default: 0.01.
    pub dt: f64,
    /// Fluid density ρ. Default: 1.0.
    pub density: f64,
    /// Kinematic viscosity ν. Default: 0.01.
    pub viscosity: f64,
    /// SOR relaxation factor ω, in `(0, 2)`. Default: 1.7.
    pub omega: f64,
    /// Poisson iteration cap. Default: 1000.
    pub max_iterations: usize,
    /// Normalised residual for early exit. `None` always runs
    /// `max_iterations` sweeps. Default: `Some(1e-6)`.
    pub tolerance: Option<f64>,
    /// Poisson sweep ordering. Default: [`Relaxation::Sor`].
    pub relaxation: Relaxation,
    /// Convective discretisation. Default: [`AdvectionScheme::Upwind`].
    pub advection: AdvectionScheme,
    /// Minimum difference for ghost influence to overwrite a fluid
    /// cell. Default: 1e-6.
    pub influence_tolerance: f64,
    /// Logging verbosity. Default: [`Verbosity::Normal`].
    pub verbosity: Verbosity,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            density: 1.0,
            viscosity: 0.01,
            omega: 1.7,
            max_iterations: 1000,
            tolerance: Some(1e-6),
            relaxation: Relaxation::Sor,
            advection: AdvectionScheme::Upwind,
            influence_tolerance: 1e-6,
            verbosity: Verbosity::Normal,
        }
    }
}

impl SolverConfig {
    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Timestep and fluid properties.
        positive("dt", self.dt)?;
        positive("density", self.density)?;
        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(invalid(
                "viscosity",
                format!("must be finite and >= 0, got {}", self.viscosity),
            ));
        }

        // 2. Relaxation factor.
        if !self.omega.is_finite() || self.omega <= 0.0 || self.omega >= 2.0 {
            return Err(invalid(
                "omega",
                format!("must lie in (0, 2), got {}", self.omega),
            ));
        }

        // 3. Iteration budget.
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be at least 1".to_string()));
        }
        if let Some(tol) = self.tolerance {
            positive("tolerance", tol)?;
        }
        self.relaxation.validate()?;

        // 4. Influence tolerance.
        if !self.influence_tolerance.is_finite() || self.influence_tolerance < 0.0 {
            return Err(invalid(
                "influence_tolerance",
                format!("must be finite and >= 0, got {}", self.influence_tolerance),
            ));
        }
        Ok(())
    }

    /// Whether `level` output should be produced.
    pub fn logs(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(name, format!("must be finite and > 0, got {value}")));
    }
    Ok(())
}

fn invalid(name: &str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}
