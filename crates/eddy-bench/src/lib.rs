//! Benchmark profiles for the Eddy flow solver.
//!
//! - [`reference_profile`]: 24³ lid-driven cavity (~14K cells)
//! - [`stress_profile`]: 64³ lid-driven cavity (~262K cells)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use eddy_core::{
    BoundaryConditionSpec, BoundaryKind, Face, GhostRules, SolverConfig, StepError, Verbosity,
};
use eddy_engine::SolverStep;
use eddy_grid::{Domain, FluidField, FluidMask, GridTopology};
use eddy_ops::MaskAndGhostBuilder;

/// Lid-driven cavity on `[0, 1]³` with `n` cells per axis.
///
/// The lid (`y_max`) slides at unit speed along x. Δt is chosen inside
/// both the advective and diffusive limits for ν = 0.01.
pub fn cavity(n: usize) -> Result<(SolverStep, FluidField), StepError> {
    let topology = GridTopology::new(Domain::new([0.0; 3], [1.0; 3], [n, n, n])?);
    let mask = FluidMask::all_fluid(topology.mesh());
    let mut lid = BoundaryConditionSpec::no_slip(&[Face::YMax]);
    lid.velocity = Some([1.0, 0.0, 0.0]);
    lid.role = Some("lid".to_string());
    let ghosts = MaskAndGhostBuilder::new(
        GhostRules::all_faces(BoundaryKind::Dirichlet),
        &[BoundaryConditionSpec::no_slip(&Face::ALL), lid],
    )?;
    let h = 1.0 / n as f64;
    let config = SolverConfig {
        dt: 0.25 * h,
        viscosity: 0.01,
        max_iterations: 200,
        verbosity: Verbosity::Quiet,
        ..SolverConfig::default()
    };
    let field = FluidField::initialize(&mask, [0.0; 3], 0.0);
    let solver = SolverStep::new(topology, mask, ghosts, config)?;
    Ok((solver, field))
}

/// 24³ cavity.
pub fn reference_profile() -> Result<(SolverStep, FluidField), StepError> {
    cavity(24)
}

/// 64³ cavity.
pub fn stress_profile() -> Result<(SolverStep, FluidField), StepError> {
    cavity(64)
}
