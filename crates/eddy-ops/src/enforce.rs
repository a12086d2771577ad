//! Ghost-cell boundary enforcement.
//!
//! Enforcement runs in three passes over the registry, always in face
//! order:
//!
//! 1. Dirichlet ghosts take their prescribed values.
//! 2. Each fluid cell bordering a Dirichlet ghost is overwritten with
//!    the ghost's value when they differ by more than the tolerance.
//!    When several ghosts border one cell the later face wins.
//! 3. Neumann ghosts copy their (possibly just overwritten) origin.
//!
//! Targets for pass 2 are resolved before anything is written, so a
//! corner cell is written at most once and a second application with
//! no intervening physics mutates nothing.

use indexmap::{IndexMap, IndexSet};

use eddy_core::{BoundaryKind, CellDiagnostics, ConfigError, MutationSource, SolverConfig};
use eddy_grid::FluidField;

use crate::ghost::GhostRegistry;

/// What one enforcement pass changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnforcementReport {
    /// Ghost values written (changed) in this pass.
    pub ghosts_written: usize,
    /// Fluid cells overwritten by ghost influence, in write order.
    pub influenced: IndexSet<usize>,
}

impl EnforcementReport {
    /// Number of fluid cells overwritten by ghost influence.
    pub fn cells_influenced(&self) -> usize {
        self.influenced.len()
    }

    /// Whether the pass mutated anything.
    pub fn mutated(&self) -> bool {
        self.ghosts_written > 0 || !self.influenced.is_empty()
    }
}

/// Writes boundary values into ghosts and their neighbouring fluid cells.
#[derive(Clone, Debug)]
pub struct BoundaryEnforcer {
    tolerance: f64,
}

/// Builder for [`BoundaryEnforcer`].
pub struct BoundaryEnforcerBuilder {
    tolerance: f64,
}

impl BoundaryEnforcer {
    /// Create a new builder.
    pub fn builder() -> BoundaryEnforcerBuilder {
        BoundaryEnforcerBuilder { tolerance: 1e-6 }
    }

    /// Build from solver configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigError> {
        Self::builder().tolerance(config.influence_tolerance).build()
    }

    /// Influence tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Apply every ghost in `registry` to `field`.
    pub fn enforce(
        &self,
        registry: &GhostRegistry,
        field: &mut FluidField,
        diagnostics: &mut CellDiagnostics,
    ) -> EnforcementReport {
        let mut report = EnforcementReport::default();

        // 1. Dirichlet ghost values.
        for rec in registry.records() {
            if let Some(v) = rec.velocity.filter(|_| rec.enforces_velocity()) {
                if field.velocity(rec.cell) != Some(v) {
                    field.set_velocity(rec.cell, Some(v));
                    diagnostics.record(rec.cell, MutationSource::BoundaryEnforcement);
                    report.ghosts_written += 1;
                }
            }
            if let Some(p) = rec.pressure.filter(|_| rec.enforces_pressure()) {
                if field.pressure(rec.cell) != Some(p) {
                    field.set_pressure(rec.cell, Some(p));
                    diagnostics.record(rec.cell, MutationSource::BoundaryEnforcement);
                    report.ghosts_written += 1;
                }
            }
        }

        // 2. Influence on origin fluid cells, last face wins.
        let mut velocity_targets: IndexMap<usize, [f64; 3]> = IndexMap::new();
        let mut pressure_targets: IndexMap<usize, f64> = IndexMap::new();
        for rec in registry.records() {
            if let Some(v) = rec.velocity.filter(|_| rec.enforces_velocity()) {
                velocity_targets.insert(rec.origin, v);
            }
            if let Some(p) = rec.pressure.filter(|_| rec.enforces_pressure()) {
                pressure_targets.insert(rec.origin, p);
            }
        }
        for (&cell, &v) in &velocity_targets {
            let stale = match field.velocity(cell) {
                Some(cur) => (0..3).any(|c| (cur[c] - v[c]).abs() > self.tolerance),
                None => true,
            };
            if stale {
                field.set_velocity(cell, Some(v));
                diagnostics.mark_influenced(cell);
                report.influenced.insert(cell);
            }
        }
        for (&cell, &p) in &pressure_targets {
            let stale = match field.pressure(cell) {
                Some(cur) => (cur - p).abs() > self.tolerance,
                None => true,
            };
            if stale {
                field.set_pressure(cell, Some(p));
                diagnostics.mark_influenced(cell);
                report.influenced.insert(cell);
            }
        }

        // 3. Neumann ghosts copy their origin.
        for rec in registry
            .records()
            .iter()
            .filter(|r| r.kind == BoundaryKind::Neumann)
        {
            if rec.apply_velocity {
                let v = field.velocity(rec.origin);
                if field.velocity(rec.cell) != v {
                    field.set_velocity(rec.cell, v);
                    diagnostics.record(rec.cell, MutationSource::BoundaryEnforcement);
                    report.ghosts_written += 1;
                }
            }
            if rec.apply_pressure {
                let p = field.pressure(rec.origin);
                if field.pressure(rec.cell) != p {
                    field.set_pressure(rec.cell, p);
                    diagnostics.record(rec.cell, MutationSource::BoundaryEnforcement);
                    report.ghosts_written += 1;
                }
            }
        }

        report
    }
}

impl BoundaryEnforcerBuilder {
    /// Minimum difference for influence to overwrite a fluid cell
    /// (default: 1e-6). Must be finite and >= 0.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Build the enforcer.
    pub fn build(self) -> Result<BoundaryEnforcer, ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "influence_tolerance".to_string(),
                reason: format!("must be finite and >= 0, got {}", self.tolerance),
            });
        }
        Ok(BoundaryEnforcer {
            tolerance: self.tolerance,
        })
    }
}
