//! Core types for the Eddy incompressible flow solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: domain
//! faces, boundary-condition records, solver tuning parameters, stable
//! identifiers, the error taxonomy, and the per-cell diagnostics side
//! channel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod face;
pub mod id;

pub use boundary::{
    resolve_condition, BoundaryConditionSpec, BoundaryKind, GhostRules, Quantity, ResolvedCondition,
};
pub use config::{AdvectionScheme, Relaxation, SolverConfig, Verbosity};
pub use diagnostics::{CellDiagnostics, MutationSource, NumericEvent};
pub use error::{ConfigError, StepError};
pub use face::{Axis, Face};
pub use id::{GhostId, StepId};
