//! What a solver step hands back.

use eddy_core::{CellDiagnostics, NumericEvent, StepId};
use eddy_grid::FluidField;
use eddy_ops::{DivergenceField, DivergenceStats, EnforcementReport, PoissonReport};

use crate::metrics::{FlowMetrics, StepMetrics};
use crate::solver::Phase;

/// Everything observed during one step, besides the new field.
#[derive(Clone, Debug)]
pub struct StepReport {
    /// The step this report describes.
    pub step: StepId,
    /// Phases entered, in order.
    pub phases: Vec<Phase>,
    /// ∇·u* of the tentative velocity.
    pub divergence_pre: DivergenceField,
    /// ∇·u after correction and re-enforcement.
    pub divergence_post: DivergenceField,
    /// ∇·u straight after correction, before re-enforcement.
    pub divergence_corrected: DivergenceStats,
    /// Poisson solve outcome.
    pub poisson: PoissonReport,
    /// Boundary enforcement before advection.
    pub enforcement_pre: EnforcementReport,
    /// Boundary enforcement after correction.
    pub enforcement_post: EnforcementReport,
    /// Fluid cells the corrector updated.
    pub cells_corrected: usize,
    /// Largest explicitly stable Δt for the incoming field.
    pub stable_dt: Option<f64>,
    /// Recoverable numeric excursions.
    pub events: Vec<NumericEvent>,
    /// Physical summary of the new field.
    pub flow: FlowMetrics,
    /// Phase timings.
    pub timings: StepMetrics,
    /// Per-cell influence and mutation tracking.
    pub diagnostics: CellDiagnostics,
}

impl StepReport {
    /// Fluid cells overwritten by ghost influence across both
    /// enforcement passes.
    pub fn ghost_influence_count(&self) -> usize {
        self.enforcement_pre.cells_influenced() + self.enforcement_post.cells_influenced()
    }

    /// Whether mean |∇·u| did not grow across the projection.
    pub fn divergence_reduced(&self) -> bool {
        self.divergence_post.stats().mean_abs <= self.divergence_pre.stats().mean_abs
    }

    /// Whether the step completed without any numeric event.
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }
}

/// The new field and its report.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// Velocity and pressure at the end of the step.
    pub field: FluidField,
    /// Observations made along the way.
    pub report: StepReport,
}
