//! Padded-array index arithmetic.
//!
//! The padded shape is `[nx + 2, ny + 2, nz + 2]`. Flat indices are
//! row-major with `k` fastest:
//!
//! ```text
//! idx = (i * (ny + 2) + j) * (nz + 2) + k
//! ```
//!
//! Interior cells have `1 <= i <= nx` (and likewise for `j`, `k`);
//! indices `0` and `n + 1` along an axis form the ghost layer.

use eddy_core::{Axis, Face, StepError};
use smallvec::SmallVec;

use crate::domain::Domain;

/// Spacing and padded shape derived from a [`Domain`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    spacing: [f64; 3],
    interior: [usize; 3],
    padded: [usize; 3],
}

impl Mesh {
    /// Derive the mesh for `domain`.
    pub fn new(domain: &Domain) -> Self {
        let interior = domain.resolution();
        Self {
            spacing: domain.spacing(),
            interior,
            padded: interior.map(|n| n + 2),
        }
    }

    /// Cell spacing `[dx, dy, dz]`.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Spacing along `axis`.
    pub fn spacing_along(&self, axis: Axis) -> f64 {
        self.spacing[axis.index()]
    }

    /// Interior shape `[nx, ny, nz]`.
    pub fn interior_shape(&self) -> [usize; 3] {
        self.interior
    }

    /// Padded shape `[nx + 2, ny + 2, nz + 2]`.
    pub fn padded_shape(&self) -> [usize; 3] {
        self.padded
    }

    /// Total padded cell count.
    pub fn len(&self) -> usize {
        self.padded[0] * self.padded[1] * self.padded[2]
    }

    /// Always `false`: a mesh has at least one interior cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of interior cells.
    pub fn interior_len(&self) -> usize {
        self.interior[0] * self.interior[1] * self.interior[2]
    }

    /// Flat index of padded coordinates `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.padded[1] + j) * self.padded[2] + k
    }

    /// Padded coordinates of flat index `idx`.
    #[inline]
    pub fn coords(&self, idx: usize) -> [usize; 3] {
        let k = idx % self.padded[2];
        let rest = idx / self.padded[2];
        [rest / self.padded[1], rest % self.padded[1], k]
    }

    /// Flat-index distance between neighbours along `axis`.
    #[inline]
    pub fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.padded[1] * self.padded[2],
            Axis::Y => self.padded[2],
            Axis::Z => 1,
        }
    }

    /// Strides for all three axes.
    pub fn strides(&self) -> [usize; 3] {
        [self.stride(Axis::X), self.stride(Axis::Y), self.stride(Axis::Z)]
    }

    /// Whether `idx` is an interior (non-padding) cell.
    pub fn is_interior(&self, idx: usize) -> bool {
        if idx >= self.len() {
            return false;
        }
        let c = self.coords(idx);
        (0..3).all(|a| c[a] >= 1 && c[a] <= self.interior[a])
    }

    /// Neighbour of `idx` one step along `axis` (`step` is `-1` or `+1`).
    ///
    /// Returns `None` when the step would leave the padded array.
    pub fn offset(&self, idx: usize, axis: Axis, step: isize) -> Option<usize> {
        let c = self.coords(idx);
        let a = axis.index();
        let moved = c[a] as isize + step;
        if moved < 0 || moved as usize >= self.padded[a] {
            return None;
        }
        Some((idx as isize + step * self.stride(axis) as isize) as usize)
    }

    /// The padding cell across `face` from interior cell `idx`.
    pub fn across(&self, idx: usize, face: Face) -> Option<usize> {
        self.offset(idx, face.axis(), face.outward())
    }

    /// Faces whose first interior layer contains `idx`, in face order.
    pub fn touching_faces(&self, idx: usize) -> SmallVec<[Face; 3]> {
        let c = self.coords(idx);
        Face::ALL
            .into_iter()
            .filter(|f| {
                let a = f.axis().index();
                if f.is_min() {
                    c[a] == 1
                } else {
                    c[a] == self.interior[a]
                }
            })
            .collect()
    }

    /// Interior flat indices in canonical order (`i` outermost).
    pub fn interior_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let [nx, ny, nz] = self.interior;
        (1..=nx).flat_map(move |i| {
            (1..=ny).flat_map(move |j| (1..=nz).map(move |k| self.index(i, j, k)))
        })
    }

    /// Fail unless `len` matches the padded cell count.
    pub fn check_len(&self, what: &'static str, len: usize) -> Result<(), StepError> {
        if len != self.len() {
            return Err(StepError::ShapeMismatch {
                what,
                expected: self.len(),
                actual: len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(n: [usize; 3]) -> Mesh {
        Mesh::new(&Domain::unit_cells(n).unwrap())
    }

    #[test]
    fn padded_shape_adds_ghost_layer() {
        let m = mesh([4, 3, 2]);
        assert_eq!(m.padded_shape(), [6, 5, 4]);
        assert_eq!(m.len(), 120);
        assert_eq!(m.interior_len(), 24);
    }

    #[test]
    fn index_and_coords_agree() {
        let m = mesh([3, 4, 5]);
        for idx in 0..m.len() {
            let [i, j, k] = m.coords(idx);
            assert_eq!(m.index(i, j, k), idx);
        }
    }

    #[test]
    fn k_is_fastest() {
        let m = mesh([3, 3, 3]);
        assert_eq!(m.index(1, 1, 2) - m.index(1, 1, 1), 1);
        assert_eq!(m.stride(Axis::Y), 5);
        assert_eq!(m.stride(Axis::X), 25);
    }

    #[test]
    fn interior_iteration_is_canonical() {
        let m = mesh([2, 2, 2]);
        let cells: Vec<[usize; 3]> = m.interior_indices().map(|c| m.coords(c)).collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], [1, 1, 1]);
        assert_eq!(cells[1], [1, 1, 2]);
        assert_eq!(cells[7], [2, 2, 2]);
        assert!(m.interior_indices().all(|c| m.is_interior(c)));
    }

    #[test]
    fn offset_stops_at_array_edge() {
        let m = mesh([2, 2, 2]);
        let corner = m.index(0, 0, 0);
        assert_eq!(m.offset(corner, Axis::X, -1), None);
        assert_eq!(m.offset(corner, Axis::Z, 1), Some(m.index(0, 0, 1)));
        let far = m.index(3, 3, 3);
        assert_eq!(m.offset(far, Axis::Y, 1), None);
    }

    #[test]
    fn corner_cell_touches_three_faces() {
        let m = mesh([3, 3, 3]);
        let faces = m.touching_faces(m.index(1, 3, 1));
        assert_eq!(faces.as_slice(), &[Face::XMin, Face::YMax, Face::ZMin]);
        assert!(m.touching_faces(m.index(2, 2, 2)).is_empty());
        assert_eq!(m.across(m.index(1, 2, 2), Face::XMin), Some(m.index(0, 2, 2)));
    }

    #[test]
    fn single_cell_touches_all_faces() {
        let m = mesh([1, 1, 1]);
        assert_eq!(m.touching_faces(m.index(1, 1, 1)).len(), 6);
    }

    #[test]
    fn check_len_reports_mismatch() {
        let m = mesh([2, 2, 2]);
        assert!(m.check_len("velocity", 64).is_ok());
        assert_eq!(
            m.check_len("velocity", 8),
            Err(StepError::ShapeMismatch {
                what: "velocity",
                expected: 64,
                actual: 8,
            })
        );
    }
}
