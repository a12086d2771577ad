//! Physical domain definition.

use eddy_core::{Axis, ConfigError};

/// A rectangular domain and its cell resolution.
///
/// Invariants, checked by [`Domain::new`]: every bound is finite,
/// `max > min` on each axis, and every resolution is at least 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    min: [f64; 3],
    max: [f64; 3],
    resolution: [usize; 3],
}

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

impl Domain {
    /// Create a domain, validating bounds and resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use eddy_grid::Domain;
    ///
    /// let d = Domain::new([0.0; 3], [1.0, 2.0, 4.0], [4, 4, 4]).unwrap();
    /// assert_eq!(d.spacing(), [0.25, 0.5, 1.0]);
    /// assert!(Domain::new([0.0; 3], [1.0; 3], [0, 4, 4]).is_err());
    /// ```
    pub fn new(min: [f64; 3], max: [f64; 3], resolution: [usize; 3]) -> Result<Self, ConfigError> {
        for a in 0..3 {
            if !min[a].is_finite() || !max[a].is_finite() || max[a] <= min[a] {
                return Err(ConfigError::InvalidBounds {
                    axis: AXIS_NAMES[a],
                    min: min[a],
                    max: max[a],
                });
            }
            if resolution[a] == 0 {
                return Err(ConfigError::InvalidResolution {
                    axis: AXIS_NAMES[a],
                    value: resolution[a],
                });
            }
        }
        Ok(Self {
            min,
            max,
            resolution,
        })
    }

    /// Unit-spaced domain `[0, n]` on each axis.
    pub fn unit_cells(resolution: [usize; 3]) -> Result<Self, ConfigError> {
        let max = resolution.map(|n| n as f64);
        Self::new([0.0; 3], max, resolution)
    }

    /// Lower bounds `[min_x, min_y, min_z]`.
    pub fn min(&self) -> [f64; 3] {
        self.min
    }

    /// Upper bounds `[max_x, max_y, max_z]`.
    pub fn max(&self) -> [f64; 3] {
        self.max
    }

    /// Interior cell counts `[nx, ny, nz]`.
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    /// Cell spacing `[dx, dy, dz]`.
    pub fn spacing(&self) -> [f64; 3] {
        let mut h = [0.0; 3];
        for (a, slot) in h.iter_mut().enumerate() {
            *slot = (self.max[a] - self.min[a]) / self.resolution[a] as f64;
        }
        h
    }

    /// Lower bound along `axis`.
    pub fn min_along(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    /// Upper bound along `axis`.
    pub fn max_along(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_rejected() {
        let err = Domain::new([0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [2, 2, 2]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBounds {
                axis: "y",
                min: 1.0,
                max: 1.0,
            }
        );
    }

    #[test]
    fn non_finite_bounds_rejected() {
        assert!(Domain::new([f64::NAN, 0.0, 0.0], [1.0; 3], [2, 2, 2]).is_err());
        assert!(Domain::new([0.0; 3], [1.0, f64::INFINITY, 1.0], [2, 2, 2]).is_err());
    }

    #[test]
    fn zero_resolution_rejected() {
        let err = Domain::new([0.0; 3], [1.0; 3], [2, 2, 0]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidResolution { axis: "z", value: 0 });
    }

    #[test]
    fn unit_cells_have_unit_spacing() {
        let d = Domain::unit_cells([10, 5, 3]).unwrap();
        assert_eq!(d.spacing(), [1.0, 1.0, 1.0]);
        assert_eq!(d.max_along(Axis::Y), 5.0);
    }
}
