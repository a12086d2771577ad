//! Per-cell diagnostics and recoverable numeric events.
//!
//! [`CellDiagnostics`] is a side output carried next to the physics
//! state, never inside it. Each stage records which cells it wrote so
//! downstream scorers can attribute changes without the numeric types
//! knowing about them.

use std::fmt;

/// The stage that last wrote a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationSource {
    /// Ghost value written, or fluid cell overwritten by ghost influence.
    BoundaryEnforcement,
    /// Explicit advection/diffusion predictor.
    AdvectionDiffusion,
    /// Pressure-correction projection.
    PressureCorrection,
    /// Non-finite value reset to zero by the post-step sanity pass.
    Sanitized,
}

impl fmt::Display for MutationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BoundaryEnforcement => "boundary_enforcement",
            Self::AdvectionDiffusion => "advection_diffusion",
            Self::PressureCorrection => "pressure_correction",
            Self::Sanitized => "sanitized",
        };
        f.write_str(name)
    }
}

/// Fixed-schema per-cell diagnostics, aligned with the padded grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CellDiagnostics {
    influenced_by_ghost: Vec<bool>,
    mutation_source: Vec<Option<MutationSource>>,
}

impl CellDiagnostics {
    /// Empty diagnostics for `len` cells.
    pub fn new(len: usize) -> Self {
        Self {
            influenced_by_ghost: vec![false; len],
            mutation_source: vec![None; len],
        }
    }

    /// Number of cells covered.
    pub fn len(&self) -> usize {
        self.influenced_by_ghost.len()
    }

    /// Whether no cells are covered.
    pub fn is_empty(&self) -> bool {
        self.influenced_by_ghost.is_empty()
    }

    /// Record that `source` wrote cell `idx`.
    pub fn record(&mut self, idx: usize, source: MutationSource) {
        if let Some(slot) = self.mutation_source.get_mut(idx) {
            *slot = Some(source);
        }
    }

    /// Tag cell `idx` as overwritten by a ghost.
    pub fn mark_influenced(&mut self, idx: usize) {
        if let Some(slot) = self.influenced_by_ghost.get_mut(idx) {
            *slot = true;
        }
        self.record(idx, MutationSource::BoundaryEnforcement);
    }

    /// Whether cell `idx` has been overwritten by a ghost.
    pub fn influenced_by_ghost(&self, idx: usize) -> bool {
        self.influenced_by_ghost.get(idx).copied().unwrap_or(false)
    }

    /// The stage that last wrote cell `idx`, if any.
    pub fn mutation_source(&self, idx: usize) -> Option<MutationSource> {
        self.mutation_source.get(idx).copied().flatten()
    }

    /// Number of cells tagged as ghost-influenced.
    pub fn influenced_count(&self) -> usize {
        self.influenced_by_ghost.iter().filter(|&&b| b).count()
    }

    /// Clear all tags, keeping the length.
    pub fn reset(&mut self) {
        self.influenced_by_ghost.fill(false);
        self.mutation_source.fill(None);
    }
}

/// A recoverable numeric excursion observed during a step.
///
/// These never abort the step; they are logged at `warn` and returned
/// in the step report for the caller to act on.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericEvent {
    /// The Poisson potential went non-finite and was clamped.
    NonFinitePotential {
        /// Number of cell updates that were clamped.
        clamped_cells: usize,
    },
    /// The Poisson solve hit its iteration cap above tolerance.
    NonConvergence {
        /// Sweeps performed.
        iterations: usize,
        /// Final normalised residual.
        residual: f64,
    },
    /// Mean absolute divergence grew across the projection.
    DivergenceIncreased {
        /// Mean |∇·u*| before correction.
        before: f64,
        /// Mean |∇·u| after correction and re-enforcement.
        after: f64,
    },
    /// Non-finite velocity or pressure reset to zero after the step.
    NonFiniteField {
        /// Number of cells reset.
        cells: usize,
    },
    /// Δt exceeds the explicit stability limit.
    UnstableTimestep {
        /// Requested timestep.
        dt: f64,
        /// Largest stable timestep for the current field.
        limit: f64,
    },
}

impl fmt::Display for NumericEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinitePotential { clamped_cells } => {
                write!(f, "clamped {clamped_cells} non-finite potential values")
            }
            Self::NonConvergence {
                iterations,
                residual,
            } => write!(
                f,
                "pressure solver did not converge: iter={iterations}, residual={residual:.2e}"
            ),
            Self::DivergenceIncreased { before, after } => write!(
                f,
                "mean divergence increased across projection: {before:.3e} -> {after:.3e}"
            ),
            Self::NonFiniteField { cells } => {
                write!(f, "reset {cells} non-finite field values to zero")
            }
            Self::UnstableTimestep { dt, limit } => {
                write!(f, "dt {dt:.3e} exceeds stable limit {limit:.3e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_diagnostics_are_clear() {
        let d = CellDiagnostics::new(8);
        assert_eq!(d.len(), 8);
        assert_eq!(d.influenced_count(), 0);
        assert_eq!(d.mutation_source(3), None);
    }

    #[test]
    fn influence_records_source() {
        let mut d = CellDiagnostics::new(4);
        d.record(1, MutationSource::AdvectionDiffusion);
        d.mark_influenced(2);
        assert!(d.influenced_by_ghost(2));
        assert!(!d.influenced_by_ghost(1));
        assert_eq!(d.mutation_source(1), Some(MutationSource::AdvectionDiffusion));
        assert_eq!(d.mutation_source(2), Some(MutationSource::BoundaryEnforcement));
        assert_eq!(d.influenced_count(), 1);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut d = CellDiagnostics::new(2);
        d.mark_influenced(10);
        assert!(!d.influenced_by_ghost(10));
        assert_eq!(d.influenced_count(), 0);
    }

    #[test]
    fn reset_clears_tags() {
        let mut d = CellDiagnostics::new(3);
        d.mark_influenced(0);
        d.reset();
        assert_eq!(d.influenced_count(), 0);
        assert_eq!(d.mutation_source(0), None);
    }
}
