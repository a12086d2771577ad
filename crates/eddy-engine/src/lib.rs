//! Fractional-step orchestration for the Eddy flow solver.
//!
//! [`SolverStep`] sequences the operators of `eddy-ops` into one
//! projection timestep and reports what happened in a [`StepReport`].
//! [`SimulationConfig`] reads a run description from JSON and builds
//! the solver and its initial field.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod report;
pub mod solver;

pub use config::{
    DomainDefinition, FluidProperties, GeometryDefinition, InitialConditions, MaskEncoding,
    SimulationConfig, SimulationParameters, SolverSection,
};
pub use metrics::{FlowMetrics, StepMetrics};
pub use report::{StepOutcome, StepReport};
pub use solver::{Phase, SolverStep};
