//! Iterative Poisson solver for the pressure-correction potential.
//!
//! Solves `∇²φ = b` over interior fluid cells. Non-fluid cells hold
//! fixed reference values: zero for [`PoissonSolver::solve`], or the
//! caller's values for [`PoissonSolver::solve_with_boundary`].
//!
//! Each relaxation update is
//!
//! ```text
//! gs    = [ (φ(i+1)+φ(i-1))/dx² + (φ(j+1)+φ(j-1))/dy² + (φ(k+1)+φ(k-1))/dz² − b ]
//!         / [ 2(1/dx² + 1/dy² + 1/dz²) ]
//! φ_new = (1 − ω)·φ_old + ω·gs
//! ```
//!
//! [`Relaxation::Multigrid`] replaces single sweeps by V-cycles over a
//! coarsened hierarchy; see the `multigrid` submodule.
//!
//! Convergence is not guaranteed within the iteration cap. The result
//! is a best-effort potential; callers re-measure divergence after
//! applying it.

use eddy_core::{ConfigError, Relaxation, SolverConfig, StepError, Verbosity};
use eddy_grid::{FluidMask, Mesh};

use crate::stencil::clamp_finite;

mod multigrid;

use multigrid::Hierarchy;

/// How a solve ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// The residual met the tolerance.
    Converged,
    /// The iteration cap was reached above tolerance.
    IterationLimit,
    /// No tolerance was set; the full iteration count ran.
    FixedIterations,
}

/// Outcome of a Poisson solve.
#[derive(Clone, Debug, PartialEq)]
pub struct PoissonReport {
    /// Sweeps performed.
    pub iterations: usize,
    /// Final normalised residual `sqrt(Σ(∇²φ − b)² / N)`.
    pub residual: f64,
    /// How the solve ended.
    pub status: SolveStatus,
    /// Updates that produced a non-finite value and were clamped.
    pub clamped: usize,
}

impl PoissonReport {
    /// Whether the tolerance was met.
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Potential and solve report.
#[derive(Clone, Debug)]
pub struct PoissonSolution {
    /// φ over the padded grid.
    pub phi: Vec<f64>,
    /// Solve statistics.
    pub report: PoissonReport,
}

/// Relaxation solver for `∇²φ = b`.
#[derive(Clone, Debug)]
pub struct PoissonSolver {
    omega: f64,
    max_iterations: usize,
    tolerance: Option<f64>,
    relaxation: Relaxation,
    verbosity: Verbosity,
}

/// Builder for [`PoissonSolver`].
pub struct PoissonSolverBuilder {
    omega: f64,
    max_iterations: usize,
    tolerance: Option<f64>,
    relaxation: Relaxation,
    verbosity: Verbosity,
}

/// Seven-point stencil coefficients for one mesh.
#[derive(Clone, Debug)]
struct Stencil {
    strides: [usize; 3],
    inv_h2: [f64; 3],
    diag: f64,
}

impl Stencil {
    fn new(mesh: &Mesh) -> Self {
        let h = mesh.spacing();
        Self::from_parts(mesh.strides(), h.map(|h| 1.0 / (h * h)))
    }

    fn from_parts(strides: [usize; 3], inv_h2: [f64; 3]) -> Self {
        Self {
            strides,
            inv_h2,
            diag: 2.0 * (inv_h2[0] + inv_h2[1] + inv_h2[2]),
        }
    }

    /// Gauss-Seidel target value at `c`.
    #[inline]
    fn gs(&self, phi: &[f64], c: usize, b: f64) -> f64 {
        let mut acc = -b;
        for a in 0..3 {
            let s = self.strides[a];
            acc += (phi[c + s] + phi[c - s]) * self.inv_h2[a];
        }
        acc / self.diag
    }

    #[inline]
    fn laplacian(&self, phi: &[f64], c: usize) -> f64 {
        let mut lap = 0.0;
        for a in 0..3 {
            let s = self.strides[a];
            lap += (phi[c + s] + phi[c - s] - 2.0 * phi[c]) * self.inv_h2[a];
        }
        lap
    }
}

/// Normalised residual `sqrt(Σ(∇²φ − b)² / N)` over fluid cells.
///
/// Zero when there are no fluid cells.
pub fn residual(mesh: &Mesh, mask: &FluidMask, phi: &[f64], rhs: &[f64]) -> f64 {
    let stencil = Stencil::new(mesh);
    let cells: Vec<usize> = mask.fluid_indices().collect();
    residual_over(&stencil, &cells, phi, rhs)
}

fn residual_over(stencil: &Stencil, cells: &[usize], phi: &[f64], rhs: &[f64]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    let sum: f64 = cells
        .iter()
        .map(|&c| {
            let r = stencil.laplacian(phi, c) - rhs[c];
            r * r
        })
        .sum();
    (sum / cells.len() as f64).sqrt()
}

impl PoissonSolver {
    /// Create a new builder.
    pub fn builder() -> PoissonSolverBuilder {
        PoissonSolverBuilder {
            omega: 1.7,
            max_iterations: 1000,
            tolerance: Some(1e-6),
            relaxation: Relaxation::Sor,
            verbosity: Verbosity::Normal,
        }
    }

    /// Build from solver configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigError> {
        Self::builder()
            .omega(config.omega)
            .max_iterations(config.max_iterations)
            .tolerance(config.tolerance)
            .relaxation(config.relaxation)
            .verbosity(config.verbosity)
            .build()
    }

    /// Relaxation factor.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Solve with `φ = 0` on every non-fluid cell, starting from zero.
    pub fn solve(
        &self,
        mesh: &Mesh,
        mask: &FluidMask,
        rhs: &[f64],
    ) -> Result<PoissonSolution, StepError> {
        self.solve_with_boundary(mesh, mask, rhs, vec![0.0; mesh.len()])
    }

    /// Solve starting from `phi`, holding its non-fluid entries fixed.
    pub fn solve_with_boundary(
        &self,
        mesh: &Mesh,
        mask: &FluidMask,
        rhs: &[f64],
        mut phi: Vec<f64>,
    ) -> Result<PoissonSolution, StepError> {
        mesh.check_len("rhs", rhs.len())?;
        mesh.check_len("phi", phi.len())?;
        mesh.check_len("mask", mask.len())?;

        let stencil = Stencil::new(mesh);
        let cells: Vec<usize> = mask.fluid_indices().collect();
        let (red, black) = match self.relaxation {
            Relaxation::RedBlack => red_black(mesh, &cells),
            _ => (Vec::new(), Vec::new()),
        };
        let mut scratch = match self.relaxation {
            Relaxation::Jacobi => phi.clone(),
            _ => Vec::new(),
        };
        let hierarchy = match self.relaxation {
            Relaxation::Multigrid { levels, .. } => {
                Some(Hierarchy::build(mesh, &stencil, &cells, levels)?)
            }
            _ => None,
        };

        let mut clamped = 0usize;
        let mut iterations = 0usize;
        let mut residual = f64::NAN;
        let mut status = SolveStatus::FixedIterations;

        for iter in 1..=self.max_iterations {
            clamped += match self.relaxation {
                Relaxation::Sor => sweep(&stencil, &cells, &mut phi, rhs, self.omega),
                Relaxation::RedBlack => {
                    sweep(&stencil, &red, &mut phi, rhs, self.omega)
                        + sweep(&stencil, &black, &mut phi, rhs, self.omega)
                }
                Relaxation::Multigrid {
                    pre_smooth,
                    post_smooth,
                    ..
                } => hierarchy
                    .as_ref()
                    .map_or(0, |h| h.cycle(&mut phi, rhs, pre_smooth, post_smooth)),
                Relaxation::Jacobi => {
                    let n = jacobi_sweep(&stencil, &cells, &phi, &mut scratch, rhs);
                    std::mem::swap(&mut phi, &mut scratch);
                    n
                }
            };
            iterations = iter;

            if let Some(tol) = self.tolerance {
                residual = residual_over(&stencil, &cells, &phi, rhs);
                if self.verbosity >= Verbosity::Trace {
                    log::trace!("poisson iter {iter}: residual {residual:.3e}");
                }
                if residual <= tol {
                    status = SolveStatus::Converged;
                    break;
                }
                status = SolveStatus::IterationLimit;
            }
        }
        if self.tolerance.is_none() {
            residual = residual_over(&stencil, &cells, &phi, rhs);
        }

        if clamped > 0 {
            log::warn!("clamped {clamped} non-finite potential values during pressure solve");
        }
        if status == SolveStatus::IterationLimit {
            log::warn!(
                "Pressure solver did not converge: iter={iterations}, residual={residual:.2e}"
            );
        } else if self.verbosity >= Verbosity::Verbose {
            log::debug!("pressure solve: {status:?} after {iterations} iterations, residual {residual:.3e}");
        }

        Ok(PoissonSolution {
            phi,
            report: PoissonReport {
                iterations,
                residual,
                status,
                clamped,
            },
        })
    }
}

/// Split `cells` by the parity of `i + j + k`, red first.
fn red_black(mesh: &Mesh, cells: &[usize]) -> (Vec<usize>, Vec<usize>) {
    cells.iter().copied().partition(|&c| {
        let [i, j, k] = mesh.coords(c);
        (i + j + k) % 2 == 0
    })
}

/// One in-place relaxation pass over `cells`. Returns clamped updates.
fn sweep(stencil: &Stencil, cells: &[usize], phi: &mut [f64], rhs: &[f64], omega: f64) -> usize {
    let mut clamped = 0;
    for &c in cells {
        let gs = stencil.gs(phi, c, rhs[c]);
        let (v, hit) = clamp_finite((1.0 - omega) * phi[c] + omega * gs);
        phi[c] = v;
        clamped += usize::from(hit);
    }
    clamped
}

fn jacobi_sweep(
    stencil: &Stencil,
    cells: &[usize],
    phi: &[f64],
    next: &mut [f64],
    rhs: &[f64],
) -> usize {
    let mut clamped = 0;
    for &c in cells {
        let (v, hit) = clamp_finite(stencil.gs(phi, c, rhs[c]));
        next[c] = v;
        clamped += usize::from(hit);
    }
    clamped
}

impl PoissonSolverBuilder {
    /// Relaxation factor ω (default: 1.7). Must lie in `(0, 2)`.
    pub fn omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    /// Iteration cap (default: 1000). Must be at least 1.
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Residual tolerance for early exit (default: `Some(1e-6)`).
    pub fn tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sweep ordering (default: [`Relaxation::Sor`]).
    pub fn relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Logging verbosity (default: [`Verbosity::Normal`]).
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Build the solver, validating all parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if `omega` is outside
    /// `(0, 2)`, `max_iterations` is zero, `tolerance` is not a
    /// positive finite number, or a multigrid ordering has no levels
    /// or no smoothing.
    pub fn build(self) -> Result<PoissonSolver, ConfigError> {
        if !self.omega.is_finite() || self.omega <= 0.0 || self.omega >= 2.0 {
            return Err(ConfigError::InvalidParameter {
                name: "omega".to_string(),
                reason: format!("must lie in (0, 2), got {}", self.omega),
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(tol) = self.tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "tolerance".to_string(),
                    reason: format!("must be finite and > 0, got {tol}"),
                });
            }
        }
        self.relaxation.validate()?;
        Ok(PoissonSolver {
            omega: self.omega,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            relaxation: self.relaxation,
            verbosity: self.verbosity,
        })
    }
}
