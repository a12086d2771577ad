//! The fractional-step orchestrator.
//!
//! [`SolverStep`] owns the static setup of a run (topology, fluid mask,
//! ghost registry, operators) and advances a [`FluidField`] by one
//! timestep per [`advance()`](SolverStep::advance) call:
//!
//! ```text
//! Init → GhostBuild → BoundaryEnforcePre → AdvectDiffuse → DivergenceCompute
//!      → PoissonSolve → PressureCorrect → BoundaryEnforcePost
//!      → DivergenceRecompute → Done
//! ```
//!
//! No phase is skipped. The incoming field is never mutated; every
//! phase works on buffers owned by the step.

use std::fmt;
use std::time::Instant;

use eddy_core::{
    CellDiagnostics, MutationSource, NumericEvent, SolverConfig, StepError, StepId, Verbosity,
};
use eddy_grid::{FluidField, FluidMask, GridTopology, Mesh};
use eddy_ops::{
    AdvectionDiffusionStepper, BoundaryEnforcer, DivergenceOperator, GhostRegistry,
    MaskAndGhostBuilder, PoissonSolver, PressureCorrector, SolveStatus,
};

use crate::config::SimulationConfig;
use crate::metrics::{FlowMetrics, StepMetrics};
use crate::report::{StepOutcome, StepReport};

// ── Phase ──────────────────────────────────────────────────────────

/// Stage of a solver step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Inputs checked, buffers allocated.
    Init,
    /// Ghost topology made available.
    GhostBuild,
    /// Boundary values written before the physics.
    BoundaryEnforcePre,
    /// Tentative velocity predicted.
    AdvectDiffuse,
    /// ∇·u* measured.
    DivergenceCompute,
    /// Pressure-correction potential solved.
    PoissonSolve,
    /// Velocity projected, pressure updated.
    PressureCorrect,
    /// Boundary values written after the correction.
    BoundaryEnforcePost,
    /// ∇·u re-measured.
    DivergenceRecompute,
    /// Step complete.
    Done,
}

impl Phase {
    /// Every phase in execution order.
    pub const SEQUENCE: [Phase; 10] = [
        Phase::Init,
        Phase::GhostBuild,
        Phase::BoundaryEnforcePre,
        Phase::AdvectDiffuse,
        Phase::DivergenceCompute,
        Phase::PoissonSolve,
        Phase::PressureCorrect,
        Phase::BoundaryEnforcePost,
        Phase::DivergenceRecompute,
        Phase::Done,
    ];

    /// The phase that follows, or `None` after [`Phase::Done`].
    pub fn next(self) -> Option<Phase> {
        let pos = Self::SEQUENCE.iter().position(|&p| p == self)?;
        Self::SEQUENCE.get(pos + 1).copied()
    }

    /// Short snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::GhostBuild => "ghost_build",
            Phase::BoundaryEnforcePre => "boundary_enforce_pre",
            Phase::AdvectDiffuse => "advect_diffuse",
            Phase::DivergenceCompute => "divergence_compute",
            Phase::PoissonSolve => "poisson_solve",
            Phase::PressureCorrect => "pressure_correct",
            Phase::BoundaryEnforcePost => "boundary_enforce_post",
            Phase::DivergenceRecompute => "divergence_recompute",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Visited phases and their wall time. Entering a phase also records it
/// in the owning step, so a failed step reports where it stopped.
struct PhaseTrace<'a> {
    slot: &'a mut Phase,
    step: StepId,
    log_phases: bool,
    visited: Vec<Phase>,
    timings: Vec<(Phase, u64)>,
    current: Option<(Phase, Instant)>,
}

impl<'a> PhaseTrace<'a> {
    fn new(slot: &'a mut Phase, step: StepId, log_phases: bool) -> Self {
        Self {
            slot,
            step,
            log_phases,
            visited: Vec::new(),
            timings: Vec::new(),
            current: None,
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.finish();
        *self.slot = phase;
        self.visited.push(phase);
        self.current = Some((phase, Instant::now()));
        if self.log_phases {
            log::trace!("step {}: {phase}", self.step);
        }
    }

    fn finish(&mut self) {
        if let Some((phase, start)) = self.current.take() {
            self.timings
                .push((phase, start.elapsed().as_micros() as u64));
        }
    }
}

// ── SolverStep ─────────────────────────────────────────────────────

/// Single-threaded projection solver for one fluid domain.
///
/// Geometry is static: the ghost registry is built once in
/// [`new()`](SolverStep::new) and reused by every step.
pub struct SolverStep {
    topology: GridTopology,
    mask: FluidMask,
    ghosts: MaskAndGhostBuilder,
    registry: GhostRegistry,
    config: SolverConfig,
    enforcer: BoundaryEnforcer,
    divergence: DivergenceOperator,
    poisson: PoissonSolver,
    corrector: PressureCorrector,
    stepper: AdvectionDiffusionStepper,
    phase: Phase,
    step_id: StepId,
}

impl SolverStep {
    /// Validate `config`, build every operator and the ghost registry.
    pub fn new(
        topology: GridTopology,
        mask: FluidMask,
        ghosts: MaskAndGhostBuilder,
        config: SolverConfig,
    ) -> Result<Self, StepError> {
        config.validate()?;
        topology.mesh().check_len("mask", mask.len())?;

        let enforcer = BoundaryEnforcer::from_config(&config)?;
        let poisson = PoissonSolver::from_config(&config)?;
        let corrector = PressureCorrector::from_config(&config)?;
        let stepper = AdvectionDiffusionStepper::from_config(&config)?;
        let ghosts = ghosts.with_verbosity(config.verbosity);
        let registry = ghosts.build(&topology, &mask);

        Ok(Self {
            topology,
            mask,
            ghosts,
            registry,
            config,
            enforcer,
            divergence: DivergenceOperator::new(),
            poisson,
            corrector,
            stepper,
            phase: Phase::Init,
            step_id: StepId::default(),
        })
    }

    /// Build the solver and its initial field from a validated document.
    pub fn from_simulation(sim: &SimulationConfig) -> Result<(Self, FluidField), StepError> {
        sim.validate()?;
        let topology = GridTopology::new(sim.domain()?);
        let mask = sim.fluid_mask(topology.mesh())?;
        let field = sim.initial_field(&mask);
        let solver = Self::new(topology, mask, sim.ghost_builder()?, sim.solver_config())?;
        Ok((solver, field))
    }

    /// The grid.
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// The padded mesh.
    pub fn mesh(&self) -> &Mesh {
        self.topology.mesh()
    }

    /// The fluid mask.
    pub fn mask(&self) -> &FluidMask {
        &self.mask
    }

    /// The ghost registry in use.
    pub fn registry(&self) -> &GhostRegistry {
        &self.registry
    }

    /// The solver parameters.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Phase last entered. After a failed step this is the phase that
    /// failed.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Id of the next step to run.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Largest explicitly stable Δt for `field`.
    pub fn max_stable_dt(&self, field: &FluidField) -> Option<f64> {
        self.stepper.max_stable_dt(self.mesh(), &self.mask, field)
    }

    /// Rebuild the ghost registry from scratch.
    ///
    /// Only needed if the registry is suspected stale; geometry cannot
    /// change under a `SolverStep`.
    pub fn rebuild_ghosts(&mut self) -> &GhostRegistry {
        self.registry = self.ghosts.build(&self.topology, &self.mask);
        &self.registry
    }

    /// Advance `field` by one timestep.
    ///
    /// # Errors
    ///
    /// [`StepError::ShapeMismatch`] if `field` does not cover the mesh,
    /// [`StepError::UndefinedFluidCell`] if a fluid cell is null.
    pub fn advance(&mut self, field: &FluidField) -> Result<StepOutcome, StepError> {
        let step_start = Instant::now();
        let mut events = Vec::new();
        let dt = self.config.dt;
        let mesh = self.topology.mesh();
        let mut trace = PhaseTrace::new(
            &mut self.phase,
            self.step_id,
            self.config.logs(Verbosity::Trace),
        );

        trace.enter(Phase::Init);
        field.check_shape(mesh)?;
        field.check_defined(&self.mask)?;
        let mut diagnostics = CellDiagnostics::new(mesh.len());
        let mut work = field.clone();

        trace.enter(Phase::GhostBuild);
        let ghosts = self.registry.len();

        trace.enter(Phase::BoundaryEnforcePre);
        let enforcement_pre = self
            .enforcer
            .enforce(&self.registry, &mut work, &mut diagnostics);

        trace.enter(Phase::AdvectDiffuse);
        let stable_dt = self.stepper.max_stable_dt(mesh, &self.mask, &work);
        if let Some(limit) = stable_dt.filter(|&limit| dt > limit) {
            log::warn!("time step {dt} exceeds stable limit {limit:.3e}");
            events.push(NumericEvent::UnstableTimestep { dt, limit });
        }
        let tentative = self
            .stepper
            .step(mesh, &self.mask, &work, &mut diagnostics)?;

        trace.enter(Phase::DivergenceCompute);
        let divergence_pre = self.divergence.compute(mesh, &self.mask, &tentative)?;

        trace.enter(Phase::PoissonSolve);
        let solution = self
            .poisson
            .solve(mesh, &self.mask, &divergence_pre.rhs(dt))?;
        if solution.report.status == SolveStatus::IterationLimit {
            events.push(NumericEvent::NonConvergence {
                iterations: solution.report.iterations,
                residual: solution.report.residual,
            });
        }

        trace.enter(Phase::PressureCorrect);
        let correction =
            self.corrector
                .correct(mesh, &self.mask, &tentative, &solution.phi, &mut diagnostics)?;
        let clamped_cells = solution.report.clamped + correction.clamped;
        if clamped_cells > 0 {
            events.push(NumericEvent::NonFinitePotential { clamped_cells });
        }
        let divergence_corrected = correction.divergence.stats();
        let cells_corrected = correction.cells_corrected;
        let mut next = correction.field;

        trace.enter(Phase::BoundaryEnforcePost);
        let enforcement_post = self
            .enforcer
            .enforce(&self.registry, &mut next, &mut diagnostics);

        trace.enter(Phase::DivergenceRecompute);
        let divergence_post = self.divergence.compute(mesh, &self.mask, &next)?;
        let before = divergence_pre.stats().mean_abs;
        let after = divergence_post.stats().mean_abs;
        if after > before {
            log::warn!("divergence increased across projection: {before:.3e} -> {after:.3e}");
            events.push(NumericEvent::DivergenceIncreased { before, after });
        }

        let reset = next.sanitize(&self.mask);
        if !reset.is_empty() {
            log::warn!("reset {} non-finite fluid cells to zero", reset.len());
            for &idx in &reset {
                diagnostics.record(idx, MutationSource::Sanitized);
            }
            events.push(NumericEvent::NonFiniteField { cells: reset.len() });
        }

        let flow = FlowMetrics::measure(
            &next,
            &self.mask,
            self.config.density,
            divergence_post.stats(),
        );

        trace.enter(Phase::Done);
        trace.finish();
        let timings = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            phase_us: trace.timings,
        };

        if self.config.logs(Verbosity::Normal) {
            log::info!(
                "step {}: div {before:.3e} -> {after:.3e}, poisson {} iters (residual {:.2e}), \
                 ke {:.6e}, {} ghosts",
                self.step_id,
                solution.report.iterations,
                solution.report.residual,
                flow.kinetic_energy,
                ghosts,
            );
        }
        if self.config.logs(Verbosity::Verbose) {
            for (phase, us) in &timings.phase_us {
                log::debug!("step {} {phase}: {us} us", self.step_id);
            }
        }

        let report = StepReport {
            step: self.step_id,
            phases: trace.visited,
            divergence_pre,
            divergence_post,
            divergence_corrected,
            poisson: solution.report,
            enforcement_pre,
            enforcement_post,
            cells_corrected,
            stable_dt,
            events,
            flow,
            timings,
            diagnostics,
        };
        self.step_id = self.step_id.next();
        Ok(StepOutcome { field: next, report })
    }
}
