//! Error types for the Eddy solver.
//!
//! Only fatal conditions are errors. Recoverable numeric excursions
//! (clamped potentials, Poisson non-convergence) are reported as
//! [`NumericEvent`](crate::NumericEvent)s instead.

use std::error::Error;
use std::fmt;

use crate::boundary::Quantity;
use crate::face::Face;

/// Fatal configuration problems. No computation proceeds after one.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A domain axis has `max <= min` or a non-finite bound.
    InvalidBounds {
        /// Axis name (`"x"`, `"y"` or `"z"`).
        axis: &'static str,
        /// Lower bound as given.
        min: f64,
        /// Upper bound as given.
        max: f64,
    },
    /// A resolution entry is zero.
    InvalidResolution {
        /// Axis name.
        axis: &'static str,
        /// Resolution as given.
        value: usize,
    },
    /// A declared boundary face has no boundary-condition entry.
    MissingBoundaryCondition {
        /// The face without a condition.
        face: Face,
    },
    /// A Dirichlet condition constrains a quantity but gives no value.
    MissingDirichletValue {
        /// The face whose condition is incomplete.
        face: Face,
        /// The quantity missing a value.
        quantity: Quantity,
    },
    /// A numeric tuning parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A geometry mask does not match the domain resolution.
    GeometryMismatch {
        /// Number of cells the domain defines.
        expected: usize,
        /// Number of entries the mask provides.
        actual: usize,
    },
    /// The configuration document could not be parsed.
    Parse {
        /// Parser diagnostic.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { axis, min, max } => {
                write!(f, "invalid {axis} bounds: min {min} must be below max {max}")
            }
            Self::InvalidResolution { axis, value } => {
                write!(f, "invalid {axis} resolution {value}: must be at least 1")
            }
            Self::MissingBoundaryCondition { face } => {
                write!(f, "no boundary condition defined for face '{face}'")
            }
            Self::MissingDirichletValue { face, quantity } => {
                let q = match quantity {
                    Quantity::Velocity => "velocity",
                    Quantity::Pressure => "pressure",
                };
                write!(f, "missing {q} for face '{face}' with Dirichlet enforcement")
            }
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::GeometryMismatch { expected, actual } => {
                write!(f, "geometry mask has {actual} entries, domain has {expected} cells")
            }
            Self::Parse { reason } => write!(f, "configuration parse error: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors that abort a single solver step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// An input array does not match the mesh.
    ShapeMismatch {
        /// Which array is wrong.
        what: &'static str,
        /// Padded cell count the mesh expects.
        expected: usize,
        /// Length provided.
        actual: usize,
    },
    /// A fluid cell holds a null velocity or pressure.
    UndefinedFluidCell {
        /// Flat index of the offending cell.
        cell: usize,
    },
    /// Configuration was rejected while preparing the step.
    Config(ConfigError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} has {actual} cells, mesh expects {expected}"),
            Self::UndefinedFluidCell { cell } => {
                write!(f, "fluid cell {cell} has undefined velocity or pressure")
            }
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for StepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
