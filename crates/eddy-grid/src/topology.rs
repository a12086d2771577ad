//! Cell-centre coordinates and boundary-face adjacency.

use eddy_core::Face;

use crate::domain::Domain;
use crate::mesh::Mesh;

/// Relative tolerance for face adjacency, as a fraction of the spacing.
///
/// A cell is adjacent to a face when its centre lies half a spacing
/// from that face, to within `ADJACENCY_RTOL * h` inclusive.
pub const ADJACENCY_RTOL: f64 = 1e-6;

/// The discretised domain: a [`Domain`] and its derived [`Mesh`].
///
/// Pure and deterministic. Two topologies built from equal domains
/// produce identical coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct GridTopology {
    domain: Domain,
    mesh: Mesh,
}

impl GridTopology {
    /// Discretise `domain`.
    pub fn new(domain: Domain) -> Self {
        let mesh = Mesh::new(&domain);
        Self { domain, mesh }
    }

    /// The source domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The padded mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Centre of interior cell `(i, j, k)`, zero-based.
    ///
    /// ```text
    /// x = min_x + (i + 0.5) * dx
    /// ```
    ///
    /// Returns `None` outside the interior.
    pub fn coordinate(&self, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        let n = self.mesh.interior_shape();
        if i >= n[0] || j >= n[1] || k >= n[2] {
            return None;
        }
        Some(self.cell_center(self.mesh.index(i + 1, j + 1, k + 1)))
    }

    /// Centre of the ghost one spacing outside interior cell
    /// `(i, j, k)` across `face`.
    ///
    /// The point is returned whether or not the cell touches `face`.
    pub fn ghost_coordinate(&self, face: Face, i: usize, j: usize, k: usize) -> Option<[f64; 3]> {
        let mut p = self.coordinate(i, j, k)?;
        let axis = face.axis();
        p[axis.index()] += face.outward() as f64 * self.mesh.spacing_along(axis);
        Some(p)
    }

    /// Number of interior cells.
    pub fn cell_count(&self) -> usize {
        self.mesh.interior_len()
    }

    /// Centre of any padded cell, ghost layer included.
    ///
    /// Ghost-layer centres sit one spacing outside the first interior
    /// layer.
    pub fn cell_center(&self, idx: usize) -> [f64; 3] {
        let c = self.mesh.coords(idx);
        let min = self.domain.min();
        let h = self.mesh.spacing();
        let mut p = [0.0; 3];
        for a in 0..3 {
            p[a] = min[a] + (c[a] as f64 - 0.5) * h[a];
        }
        p
    }

    /// Centres of all interior cells in canonical order.
    pub fn coordinates(&self) -> Vec<[f64; 3]> {
        self.mesh
            .interior_indices()
            .map(|idx| self.cell_center(idx))
            .collect()
    }

    /// Whether the centre of `idx` lies half a spacing inside `face`.
    pub fn is_adjacent(&self, idx: usize, face: Face) -> bool {
        let axis = face.axis();
        let h = self.mesh.spacing_along(axis);
        let x = self.cell_center(idx)[axis.index()];
        let plane = if face.is_min() {
            self.domain.min_along(axis)
        } else {
            self.domain.max_along(axis)
        };
        let inward = if face.is_min() { x - plane } else { plane - x };
        (inward - 0.5 * h).abs() <= ADJACENCY_RTOL * h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topo(min: [f64; 3], max: [f64; 3], n: [usize; 3]) -> GridTopology {
        GridTopology::new(Domain::new(min, max, n).unwrap())
    }

    #[test]
    fn centres_follow_half_offset_rule() {
        let t = topo([-1.0, 0.0, 2.0], [1.0, 1.0, 3.0], [4, 2, 1]);
        let c = t.coordinate(0, 1, 0).unwrap();
        assert!((c[0] - (-0.75)).abs() < 1e-12);
        assert!((c[1] - 0.75).abs() < 1e-12);
        assert!((c[2] - 2.5).abs() < 1e-12);
        assert_eq!(t.coordinate(4, 0, 0), None);
    }

    #[test]
    fn ghost_centres_sit_one_spacing_out() {
        let t = topo([0.0; 3], [1.0; 3], [4, 4, 4]);
        let m = t.mesh();
        let ghost = t.cell_center(m.index(0, 2, 2));
        let first = t.cell_center(m.index(1, 2, 2));
        assert!((first[0] - ghost[0] - 0.25).abs() < 1e-12);
        assert!((ghost[0] + 0.125).abs() < 1e-12);
    }

    #[test]
    fn ghost_coordinate_steps_outward() {
        let t = topo([0.0; 3], [1.0, 2.0, 1.0], [2, 4, 2]);
        assert_eq!(t.ghost_coordinate(Face::YMin, 0, 0, 1), Some([0.25, -0.25, 0.75]));
        assert_eq!(t.ghost_coordinate(Face::XMax, 1, 3, 0), Some([1.25, 1.75, 0.25]));
        assert_eq!(t.ghost_coordinate(Face::ZMax, 0, 4, 0), None);
        assert_eq!(t.cell_count(), 16);
    }

    #[test]
    fn coordinates_enumerate_interior() {
        let t = topo([0.0; 3], [3.0, 2.0, 1.0], [3, 2, 1]);
        let coords = t.coordinates();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], [0.5, 0.5, 0.5]);
        assert_eq!(coords[5], [2.5, 1.5, 0.5]);
    }

    #[test]
    fn adjacency_matches_first_layer() {
        let t = topo([0.0; 3], [1.0, 0.3, 7.0], [5, 3, 7]);
        let m = t.mesh();
        for idx in m.interior_indices() {
            let touching = m.touching_faces(idx);
            for face in Face::ALL {
                assert_eq!(
                    t.is_adjacent(idx, face),
                    touching.contains(&face),
                    "cell {:?} face {face}",
                    m.coords(idx)
                );
            }
        }
    }
}
