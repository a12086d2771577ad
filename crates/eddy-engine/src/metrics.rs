//! Per-step timing and flow metrics.
//!
//! [`StepMetrics`] captures how long each phase of a step took.
//! [`FlowMetrics`] summarises the physical state the step produced.

use eddy_grid::{FluidField, FluidMask};
use eddy_ops::DivergenceStats;

use crate::solver::Phase;

/// Wall-clock timings for one solver step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Per-phase execution times, in execution order.
    pub phase_us: Vec<(Phase, u64)>,
}

impl StepMetrics {
    /// Time spent in `phase`, summed over its occurrences.
    pub fn time_in(&self, phase: Phase) -> u64 {
        self.phase_us
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, us)| us)
            .sum()
    }
}

/// Physical summary of a field after a step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowMetrics {
    /// `0.5 · ρ · Σ|u|²` over fluid cells.
    pub kinetic_energy: f64,
    /// `0.5 · Σ|u|²` over fluid cells.
    pub specific_kinetic_energy: f64,
    /// Largest velocity magnitude.
    pub max_velocity: f64,
    /// Smallest fluid pressure.
    pub pressure_min: f64,
    /// Largest fluid pressure.
    pub pressure_max: f64,
    /// Mean fluid pressure.
    pub pressure_mean: f64,
    /// Largest |∇·u|.
    pub divergence_max: f64,
    /// Mean |∇·u|.
    pub divergence_mean: f64,
    /// Number of fluid cells.
    pub fluid_cells: usize,
}

impl FlowMetrics {
    /// Measure `field` over `mask` with divergence `divergence`.
    pub fn measure(
        field: &FluidField,
        mask: &FluidMask,
        density: f64,
        divergence: DivergenceStats,
    ) -> Self {
        let mut m = FlowMetrics {
            pressure_min: f64::INFINITY,
            pressure_max: f64::NEG_INFINITY,
            divergence_max: divergence.max_abs,
            divergence_mean: divergence.mean_abs,
            ..Self::default()
        };
        let mut pressure_sum = 0.0;
        let mut pressures = 0usize;

        for idx in mask.fluid_indices() {
            m.fluid_cells += 1;
            if let Some(u) = field.velocity(idx) {
                let sq = u[0] * u[0] + u[1] * u[1] + u[2] * u[2];
                m.specific_kinetic_energy += 0.5 * sq;
                m.max_velocity = m.max_velocity.max(sq.sqrt());
            }
            if let Some(p) = field.pressure(idx) {
                m.pressure_min = m.pressure_min.min(p);
                m.pressure_max = m.pressure_max.max(p);
                pressure_sum += p;
                pressures += 1;
            }
        }

        if pressures == 0 {
            m.pressure_min = 0.0;
            m.pressure_max = 0.0;
        } else {
            m.pressure_mean = pressure_sum / pressures as f64;
        }
        m.kinetic_energy = density * m.specific_kinetic_energy;
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_grid::{Domain, Mesh};

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.phase_us.is_empty());
        assert_eq!(m.time_in(Phase::PoissonSolve), 0);
    }

    #[test]
    fn repeated_phases_are_summed() {
        let m = StepMetrics {
            total_us: 30,
            phase_us: vec![
                (Phase::BoundaryEnforcePre, 5),
                (Phase::PoissonSolve, 20),
                (Phase::BoundaryEnforcePost, 5),
            ],
        };
        assert_eq!(m.time_in(Phase::PoissonSolve), 20);
        assert_eq!(m.time_in(Phase::BoundaryEnforcePre), 5);
    }

    #[test]
    fn flow_metrics_of_uniform_field() {
        let mesh = Mesh::new(&Domain::unit_cells([2, 2, 2]).unwrap());
        let mask = FluidMask::all_fluid(&mesh);
        let field = FluidField::initialize(&mask, [3.0, 4.0, 0.0], -2.0);
        let m = FlowMetrics::measure(&field, &mask, 2.0, DivergenceStats::default());
        assert_eq!(m.fluid_cells, 8);
        assert_eq!(m.max_velocity, 5.0);
        assert_eq!(m.specific_kinetic_energy, 8.0 * 12.5);
        assert_eq!(m.kinetic_energy, 2.0 * 8.0 * 12.5);
        assert_eq!((m.pressure_min, m.pressure_max, m.pressure_mean), (-2.0, -2.0, -2.0));
    }

    #[test]
    fn no_fluid_gives_zero_pressure_range() {
        let mesh = Mesh::new(&Domain::unit_cells([2, 1, 1]).unwrap());
        let mask = FluidMask::from_fn(&mesh, |_, _, _| false);
        let field = FluidField::empty(mesh.len());
        let m = FlowMetrics::measure(&field, &mask, 1.0, DivergenceStats::default());
        assert_eq!(m, FlowMetrics::default());
    }
}
