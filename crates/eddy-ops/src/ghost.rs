//! Ghost-cell synthesis.
//!
//! Every fluid cell whose centre lies half a spacing inside a declared
//! boundary face gets one ghost across that face. A cell touching
//! several faces gets one ghost per face. Ghosts live in the padding
//! layer of the dense grid and are addressed by their flat index; each
//! padding cell borders exactly one interior cell, so a ghost is never
//! produced twice.

use indexmap::IndexMap;

use eddy_core::{
    resolve_condition, BoundaryConditionSpec, BoundaryKind, ConfigError, Face, GhostId,
    GhostRules, ResolvedCondition, Verbosity,
};
use eddy_grid::{FluidMask, GridTopology};

/// Classification of a padded cell once ghosts are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Interior fluid cell.
    Fluid,
    /// Interior solid cell, or padding not backed by a ghost.
    Solid,
    /// Ghost cell carrying a boundary condition.
    Ghost,
}

/// One ghost cell and the condition that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostRecord {
    /// Stable id within the issuing registry.
    pub id: GhostId,
    /// Flat index of the ghost in the padded grid.
    pub cell: usize,
    /// Flat index of the fluid cell it mirrors.
    pub origin: usize,
    /// The face it sits across.
    pub face: Face,
    /// Centre of the ghost, one spacing outside `origin`.
    pub coordinate: [f64; 3],
    /// Effective boundary type.
    pub kind: BoundaryKind,
    /// Prescribed velocity (Dirichlet on velocity only).
    pub velocity: Option<[f64; 3]>,
    /// Prescribed pressure (Dirichlet on pressure only).
    pub pressure: Option<f64>,
    /// Whether the condition constrains velocity at all.
    pub apply_velocity: bool,
    /// Whether the condition constrains pressure at all.
    pub apply_pressure: bool,
    /// Role label from the boundary condition, if any.
    pub role: Option<String>,
}

impl GhostRecord {
    /// Velocity is actively held at a prescribed value.
    pub fn enforces_velocity(&self) -> bool {
        self.kind == BoundaryKind::Dirichlet && self.velocity.is_some()
    }

    /// Pressure is actively held at a prescribed value.
    pub fn enforces_pressure(&self) -> bool {
        self.kind == BoundaryKind::Dirichlet && self.pressure.is_some()
    }
}

/// All ghosts for one grid, grouped by face in enforcement order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GhostRegistry {
    records: Vec<GhostRecord>,
    by_cell: IndexMap<usize, GhostId>,
    face_counts: [usize; 6],
}

impl GhostRegistry {
    /// Records in enforcement order.
    pub fn records(&self) -> &[GhostRecord] {
        &self.records
    }

    /// Record by id.
    pub fn get(&self, id: GhostId) -> Option<&GhostRecord> {
        self.records.get(id.0 as usize)
    }

    /// Record for the ghost at flat index `cell`.
    pub fn at_cell(&self, cell: usize) -> Option<&GhostRecord> {
        self.by_cell.get(&cell).and_then(|&id| self.get(id))
    }

    /// Whether flat index `cell` is a ghost.
    pub fn is_ghost(&self, cell: usize) -> bool {
        self.by_cell.contains_key(&cell)
    }

    /// Number of ghosts.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no ghosts.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ghost count for `face`.
    pub fn count_for(&self, face: Face) -> usize {
        self.face_counts[face.ordinal()]
    }

    /// Records on `face`.
    pub fn on_face(&self, face: Face) -> impl Iterator<Item = &GhostRecord> {
        self.records.iter().filter(move |r| r.face == face)
    }

    /// Classify padded cell `idx`.
    pub fn classify(&self, mask: &FluidMask, idx: usize) -> CellKind {
        if mask.is_fluid(idx) {
            CellKind::Fluid
        } else if self.is_ghost(idx) {
            CellKind::Ghost
        } else {
            CellKind::Solid
        }
    }

    /// The augmented cell set: a kind for every padded cell.
    pub fn cell_kinds(&self, mask: &FluidMask) -> Vec<CellKind> {
        (0..mask.len()).map(|idx| self.classify(mask, idx)).collect()
    }

    fn push(&mut self, mut record: GhostRecord) {
        let id = GhostId(self.records.len() as u32);
        record.id = id;
        self.by_cell.insert(record.cell, id);
        self.face_counts[record.face.ordinal()] += 1;
        self.records.push(record);
    }
}

/// Builds the [`GhostRegistry`] for a fluid mask.
///
/// Construction resolves the condition for every declared face, so a
/// missing condition or Dirichlet value fails before any grid work.
///
/// Build summaries are logged at [`Verbosity::Normal`] and above, the
/// per-face breakdown at [`Verbosity::Verbose`].
#[derive(Clone, Debug)]
pub struct MaskAndGhostBuilder {
    resolved: Vec<(Face, ResolvedCondition)>,
    verbosity: Verbosity,
}

impl MaskAndGhostBuilder {
    /// Validate `rules` against `conditions`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingBoundaryCondition`] if a declared face has
    ///   no condition.
    /// - [`ConfigError::MissingDirichletValue`] if a Dirichlet condition
    ///   lacks a value for a quantity it constrains.
    pub fn new(
        rules: GhostRules,
        conditions: &[BoundaryConditionSpec],
    ) -> Result<Self, ConfigError> {
        let mut resolved = Vec::new();
        for face in Face::ALL {
            if rules.declares(face) {
                resolved.push((face, resolve_condition(face, &rules, conditions)?));
            }
        }
        Ok(Self {
            resolved,
            verbosity: Verbosity::default(),
        })
    }

    /// Replace the logging verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Current logging verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Faces that receive ghosts, in enforcement order.
    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.resolved.iter().map(|(face, _)| *face)
    }

    /// Synthesise ghosts for every fluid cell adjacent to a declared face.
    pub fn build(&self, topology: &GridTopology, mask: &FluidMask) -> GhostRegistry {
        let mesh = topology.mesh();
        let mut registry = GhostRegistry::default();

        for (face, condition) in &self.resolved {
            let face = *face;
            for origin in mask.fluid_indices() {
                if !mesh.touching_faces(origin).contains(&face) {
                    continue;
                }
                let Some(cell) = mesh.across(origin, face) else {
                    continue;
                };
                registry.push(GhostRecord {
                    id: GhostId(0),
                    cell,
                    origin,
                    face,
                    coordinate: topology.cell_center(cell),
                    kind: condition.kind,
                    velocity: condition.velocity,
                    pressure: condition.pressure,
                    apply_velocity: condition.apply_velocity,
                    apply_pressure: condition.apply_pressure,
                    role: condition.role.clone(),
                });
            }
            if self.verbosity >= Verbosity::Verbose {
                log::info!(
                    "ghost face {face} ({:?}): {} ghosts",
                    condition.kind,
                    registry.count_for(face)
                );
            }
        }

        if self.verbosity >= Verbosity::Normal {
            log::info!(
                "ghost layer built: {} ghosts over {} fluid cells",
                registry.len(),
                mask.fluid_count()
            );
        }
        registry
    }
}
