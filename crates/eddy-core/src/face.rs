//! Domain faces and coordinate axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coordinate axis of the structured grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The `x` axis (index `i`).
    X,
    /// The `y` axis (index `j`).
    Y,
    /// The `z` axis (index `k`).
    Z,
}

impl Axis {
    /// All three axes in storage order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// One of the six physical faces of the rectangular domain.
///
/// The declaration order is the fixed enumeration order used for ghost
/// construction and boundary enforcement: later faces overwrite earlier
/// ones when both influence the same fluid cell.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    /// The `x = min_x` face.
    XMin,
    /// The `x = max_x` face.
    XMax,
    /// The `y = min_y` face.
    YMin,
    /// The `y = max_y` face.
    YMax,
    /// The `z = min_z` face.
    ZMin,
    /// The `z = max_z` face.
    ZMax,
}

impl Face {
    /// All faces in enforcement order.
    pub const ALL: [Face; 6] = [
        Face::XMin,
        Face::XMax,
        Face::YMin,
        Face::YMax,
        Face::ZMin,
        Face::ZMax,
    ];

    /// The axis normal to this face.
    pub fn axis(self) -> Axis {
        match self {
            Face::XMin | Face::XMax => Axis::X,
            Face::YMin | Face::YMax => Axis::Y,
            Face::ZMin | Face::ZMax => Axis::Z,
        }
    }

    /// `true` for the lower face of its axis.
    pub fn is_min(self) -> bool {
        matches!(self, Face::XMin | Face::YMin | Face::ZMin)
    }

    /// Outward unit step along the face normal: `-1` or `+1`.
    pub fn outward(self) -> isize {
        if self.is_min() {
            -1
        } else {
            1
        }
    }

    /// Position in [`Face::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Configuration name, e.g. `"x_min"`.
    pub fn name(self) -> &'static str {
        match self {
            Face::XMin => "x_min",
            Face::XMax => "x_max",
            Face::YMin => "y_min",
            Face::YMax => "y_max",
            Face::ZMin => "z_min",
            Face::ZMax => "z_max",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Face {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.name() == s)
            .ok_or_else(|| format!("unknown face '{s}'"))
    }
}
