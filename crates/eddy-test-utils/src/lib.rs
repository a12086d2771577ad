//! Test fixtures for Eddy development.
//!
//! Standard domains, boundary setups and analytic or seeded-random
//! initial fields shared by the unit, integration and benchmark code.
//! See [`fixtures`] for the field generators and sample configuration
//! documents.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use eddy_core::{BoundaryConditionSpec, BoundaryKind, Face, GhostRules};
use eddy_grid::{Domain, FluidMask, GridTopology};

pub use fixtures::{
    random_field, rotational_field, shear_field, uniform_field, SeededRng, CAVITY_JSON,
    CHANNEL_JSON,
};

/// `n³` cells of unit spacing, spanning `[0, n]` on every axis.
pub fn cube(n: usize) -> GridTopology {
    grid([n, n, n])
}

/// Unit-spacing box with the given resolution.
pub fn grid(resolution: [usize; 3]) -> GridTopology {
    match Domain::unit_cells(resolution) {
        Ok(domain) => GridTopology::new(domain),
        Err(e) => panic!("fixture resolution {resolution:?} rejected: {e}"),
    }
}

/// `n³` cells spanning `[-1, 1]` on every axis.
pub fn symmetric_cube(n: usize) -> GridTopology {
    match Domain::new([-1.0; 3], [1.0; 3], [n, n, n]) {
        Ok(domain) => GridTopology::new(domain),
        Err(e) => panic!("fixture resolution {n} rejected: {e}"),
    }
}

/// Every interior cell fluid.
pub fn open_mask(topology: &GridTopology) -> FluidMask {
    FluidMask::all_fluid(topology.mesh())
}

/// No-slip walls on all six faces.
pub fn walls() -> (GhostRules, Vec<BoundaryConditionSpec>) {
    (
        GhostRules::all_faces(BoundaryKind::Dirichlet),
        vec![BoundaryConditionSpec::no_slip(&Face::ALL)],
    )
}

/// No-slip walls on `faces` only. The remaining faces get no ghosts.
pub fn walls_on(faces: &[Face]) -> (GhostRules, Vec<BoundaryConditionSpec>) {
    (
        GhostRules {
            boundary_faces: faces.to_vec(),
            default_type: BoundaryKind::Dirichlet,
            face_types: Default::default(),
        },
        vec![BoundaryConditionSpec::no_slip(faces)],
    )
}

/// Lid-driven cavity: no-slip walls with `y_max` sliding at `speed`
/// along x.
pub fn lid_driven(speed: f64) -> (GhostRules, Vec<BoundaryConditionSpec>) {
    let (rules, mut conditions) = walls();
    let mut lid = BoundaryConditionSpec::no_slip(&[Face::YMax]);
    lid.velocity = Some([speed, 0.0, 0.0]);
    lid.role = Some("lid".to_string());
    conditions.push(lid);
    (rules, conditions)
}
