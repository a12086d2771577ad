//! Eddy: an incompressible Navier-Stokes solver using the projection
//! method on padded structured grids.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Eddy sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use eddy::prelude::*;
//!
//! // A 6³ unit-spacing box with no-slip walls and a sliding lid.
//! let topology = GridTopology::new(Domain::unit_cells([6, 6, 6]).unwrap());
//! let mask = FluidMask::all_fluid(topology.mesh());
//! let mut lid = BoundaryConditionSpec::no_slip(&[Face::YMax]);
//! lid.velocity = Some([1.0, 0.0, 0.0]);
//! let conditions = vec![BoundaryConditionSpec::no_slip(&Face::ALL), lid];
//! let ghosts = MaskAndGhostBuilder::new(
//!     GhostRules::all_faces(BoundaryKind::Dirichlet),
//!     &conditions,
//! )
//! .unwrap();
//!
//! let field = FluidField::initialize(&mask, [0.0; 3], 0.0);
//! let mut solver = SolverStep::new(topology, mask, ghosts, SolverConfig::default()).unwrap();
//! let out = solver.advance(&field).unwrap();
//! assert_eq!(out.report.phases.last(), Some(&Phase::Done));
//! assert!(out.report.flow.kinetic_energy > 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `eddy-core` | Faces, boundary records, `SolverConfig`, ids, errors, diagnostics |
//! | [`grid`] | `eddy-grid` | Domain, mesh, topology, fluid mask, field storage |
//! | [`ops`] | `eddy-ops` | Ghost building, enforcement, divergence, Poisson, correction, advection |
//! | [`engine`] | `eddy-engine` | `SolverStep`, step reports, metrics, JSON configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary, configuration and errors (`eddy-core`).
pub use eddy_core as types;

/// Structured grid storage (`eddy-grid`).
///
/// [`grid::Mesh`] owns the padded index arithmetic every operator
/// relies on.
pub use eddy_grid as grid;

/// Numerical operators (`eddy-ops`).
pub use eddy_ops as ops;

/// Step orchestration and run configuration (`eddy-engine`).
///
/// Start from [`engine::SolverStep`], or from
/// [`engine::SimulationConfig::from_json_str`] for a JSON-described run.
pub use eddy_engine as engine;

/// Common imports for typical Eddy usage.
///
/// ```rust
/// use eddy::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use eddy_core::{
        AdvectionScheme, BoundaryConditionSpec, BoundaryKind, CellDiagnostics, Face, GhostRules,
        MutationSource, NumericEvent, Quantity, Relaxation, SolverConfig, Verbosity,
    };

    // Errors
    pub use eddy_core::{ConfigError, StepError};

    // Grid
    pub use eddy_grid::{Domain, FluidField, FluidMask, GridTopology, Mesh};

    // Operators
    pub use eddy_ops::{GhostRegistry, MaskAndGhostBuilder};

    // Engine
    pub use eddy_engine::{
        FlowMetrics, Phase, SimulationConfig, SolverStep, StepMetrics, StepOutcome, StepReport,
    };
}
