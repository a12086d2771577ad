//! Numerical operators for the Eddy projection solver.
//!
//! Each operator is a small, immutable value built from validated
//! parameters and applied to borrowed grid state. None of them own a
//! field; the orchestrator in `eddy-engine` threads the state through.
//!
//! # Operator order (each timestep)
//!
//! 1. [`MaskAndGhostBuilder`] turns the fluid mask and boundary rules
//!    into a [`GhostRegistry`] (once per mask)
//! 2. [`BoundaryEnforcer`] writes ghosts and influenced fluid cells
//! 3. [`AdvectionDiffusionStepper`] predicts u*
//! 4. [`DivergenceOperator`] gives ∇·u*, the Poisson right-hand side
//! 5. [`PoissonSolver`] solves ∇²φ = (1/Δt)∇·u*
//! 6. [`PressureCorrector`] applies u = u* − (Δt/ρ)∇φ, p = p + ρφ
//! 7. [`BoundaryEnforcer`] again, then [`DivergenceOperator`] again

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advection;
pub mod correction;
pub mod divergence;
pub mod enforce;
pub mod ghost;
pub mod poisson;
pub(crate) mod stencil;

pub use advection::AdvectionDiffusionStepper;
pub use correction::{Correction, PressureCorrector};
pub use divergence::{DivergenceField, DivergenceOperator, DivergenceStats};
pub use enforce::{BoundaryEnforcer, EnforcementReport};
pub use ghost::{CellKind, GhostRecord, GhostRegistry, MaskAndGhostBuilder};
pub use poisson::{PoissonReport, PoissonSolution, PoissonSolver, SolveStatus};
