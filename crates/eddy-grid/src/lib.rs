//! Structured grid storage for Eddy.
//!
//! Everything lives on one dense, padded array per quantity: the
//! interior `nx × ny × nz` cells plus a single ghost layer on every
//! side. Cells are addressed by flat index into that padded array.
//!
//! | Type | Role |
//! |------|------|
//! | [`Domain`] | Physical bounds and resolution |
//! | [`Mesh`] | Spacing, padded shape and index arithmetic |
//! | [`GridTopology`] | Cell-centre coordinates and face adjacency |
//! | [`FluidMask`] | Fluid / non-fluid classification |
//! | [`FluidField`] | Velocity and pressure arrays |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod field;
pub mod mask;
pub mod mesh;
pub mod topology;

pub use domain::Domain;
pub use field::FluidField;
pub use mask::{FlatteningOrder, FluidMask, GeometryMask};
pub use mesh::Mesh;
pub use topology::GridTopology;
