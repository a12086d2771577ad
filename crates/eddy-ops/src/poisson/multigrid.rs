//! Geometric multigrid V-cycles on the padded grid.
//!
//! A coarse cell groups up to two fine cells along every axis with more
//! than one cell. Restriction averages the fine residual over the fluid
//! children; prolongation copies a coarse correction into each of them.
//! For that pair the Galerkin coarse operator is the fine seven-point
//! stencil with `1/h²` halved on each coarsened axis, so coarse levels
//! reuse `Stencil` with scaled coefficients and zero padding.
//!
//! The prolonged correction is scaled by the step that minimises the
//! energy norm of the error. Odd extents and obstacles make the coarse
//! operator inexact; the scaling keeps every cycle non-expanding anyway.

use eddy_core::StepError;
use eddy_grid::{Domain, Mesh};

use super::{red_black, sweep, Stencil};
use crate::stencil::clamp_finite;

/// Gauss-Seidel sweeps spent on the coarsest grid of a hierarchy.
const COARSE_SWEEPS: usize = 40;

struct Level {
    mesh: Mesh,
    stencil: Stencil,
    cells: Vec<usize>,
    red: Vec<usize>,
    black: Vec<usize>,
    /// Coarse flat index of each entry of `cells`. Empty on the
    /// coarsest level.
    parent: Vec<usize>,
}

impl Level {
    fn new(mesh: Mesh, stencil: Stencil, cells: Vec<usize>) -> Self {
        let (red, black) = red_black(&mesh, &cells);
        Self {
            mesh,
            stencil,
            cells,
            red,
            black,
            parent: Vec::new(),
        }
    }

    /// Red-black Gauss-Seidel, unit weight.
    fn smooth(&self, phi: &mut [f64], rhs: &[f64], sweeps: usize) -> usize {
        (0..sweeps)
            .map(|_| {
                sweep(&self.stencil, &self.red, phi, rhs, 1.0)
                    + sweep(&self.stencil, &self.black, phi, rhs, 1.0)
            })
            .sum()
    }

    /// Build the next coarser level, or `None` once no axis can shrink.
    fn coarsen(&mut self) -> Result<Option<Level>, StepError> {
        let n = self.mesh.interior_shape();
        if n.iter().all(|&n| n <= 2) || self.cells.is_empty() {
            return Ok(None);
        }
        let halve = n.map(|n| n >= 2);
        let coarse_n = [0, 1, 2].map(|a| if halve[a] { n[a].div_ceil(2) } else { n[a] });
        let mesh = Mesh::new(&Domain::unit_cells(coarse_n)?);

        let mut inv_h2 = self.stencil.inv_h2;
        for a in 0..3 {
            if halve[a] {
                inv_h2[a] *= 0.5;
            }
        }
        let stencil = Stencil::from_parts(mesh.strides(), inv_h2);

        // Padded index x >= 1 maps to (x - 1) / 2 + 1 on a halved axis.
        let up = |x: usize, a: usize| if halve[a] { (x - 1) / 2 + 1 } else { x };
        let mut fluid = vec![false; mesh.len()];
        self.parent = self
            .cells
            .iter()
            .map(|&c| {
                let [i, j, k] = self.mesh.coords(c);
                let p = mesh.index(up(i, 0), up(j, 1), up(k, 2));
                fluid[p] = true;
                p
            })
            .collect();

        let cells: Vec<usize> = mesh.interior_indices().filter(|&c| fluid[c]).collect();
        Ok(Some(Level::new(mesh, stencil, cells)))
    }
}

/// Grid hierarchy for one fluid mask, finest level first.
pub(super) struct Hierarchy {
    levels: Vec<Level>,
}

impl Hierarchy {
    /// Coarsen `mesh` up to `depth` levels in total. Stops early once
    /// every axis is down to two cells.
    pub(super) fn build(
        mesh: &Mesh,
        stencil: &Stencil,
        cells: &[usize],
        depth: usize,
    ) -> Result<Self, StepError> {
        let mut levels = vec![Level::new(mesh.clone(), stencil.clone(), cells.to_vec())];
        while levels.len() < depth {
            let Some(last) = levels.last_mut() else {
                break;
            };
            match last.coarsen()? {
                Some(next) => levels.push(next),
                None => break,
            }
        }
        Ok(Self { levels })
    }

    /// Number of grids actually in use.
    #[cfg(test)]
    pub(super) fn depth(&self) -> usize {
        self.levels.len()
    }

    /// One V-cycle on the finest level. Returns clamped updates.
    pub(super) fn cycle(&self, phi: &mut [f64], rhs: &[f64], pre: usize, post: usize) -> usize {
        self.v_cycle(0, phi, rhs, pre, post)
    }

    fn v_cycle(&self, l: usize, phi: &mut [f64], rhs: &[f64], pre: usize, post: usize) -> usize {
        let level = &self.levels[l];
        let Some(coarse) = self.levels.get(l + 1) else {
            let sweeps = if l == 0 { pre + post } else { COARSE_SWEEPS };
            return level.smooth(phi, rhs, sweeps);
        };

        let mut clamped = level.smooth(phi, rhs, pre);

        let residual: Vec<f64> = level
            .cells
            .iter()
            .map(|&c| rhs[c] - level.stencil.laplacian(phi, c))
            .collect();
        let mut coarse_rhs = vec![0.0; coarse.mesh.len()];
        let mut children = vec![0u32; coarse.mesh.len()];
        for (r, &p) in residual.iter().zip(&level.parent) {
            coarse_rhs[p] += r;
            children[p] += 1;
        }
        for &p in &coarse.cells {
            coarse_rhs[p] /= f64::from(children[p].max(1));
        }

        let mut coarse_phi = vec![0.0; coarse.mesh.len()];
        clamped += self.v_cycle(l + 1, &mut coarse_phi, &coarse_rhs, pre, post);

        let mut correction = vec![0.0; level.mesh.len()];
        for (&c, &p) in level.cells.iter().zip(&level.parent) {
            correction[c] = coarse_phi[p];
        }
        let mut along = 0.0;
        let mut curvature = 0.0;
        for (&c, r) in level.cells.iter().zip(&residual) {
            along += r * correction[c];
            curvature += correction[c] * level.stencil.laplacian(&correction, c);
        }
        // The stencil is negative definite, so a useful step has
        // curvature < 0.
        let step = if curvature < 0.0 { along / curvature } else { 0.0 };
        for &c in &level.cells {
            let (v, hit) = clamp_finite(phi[c] + step * correction[c]);
            phi[c] = v;
            clamped += usize::from(hit);
        }

        clamped + level.smooth(phi, rhs, post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_grid::FluidMask;

    fn hierarchy(n: [usize; 3], depth: usize) -> (Mesh, Hierarchy) {
        let mesh = Mesh::new(&Domain::unit_cells(n).unwrap());
        let cells: Vec<usize> = FluidMask::all_fluid(&mesh).fluid_indices().collect();
        let h = Hierarchy::build(&mesh, &Stencil::new(&mesh), &cells, depth).unwrap();
        (mesh, h)
    }

    #[test]
    fn extents_halve_rounding_up() {
        let (_, h) = hierarchy([10, 5, 1], 4);
        let shapes: Vec<[usize; 3]> = h.levels.iter().map(|l| l.mesh.interior_shape()).collect();
        assert_eq!(shapes, [[10, 5, 1], [5, 3, 1], [3, 2, 1], [2, 1, 1]]);
        assert_eq!(h.levels[1].stencil.inv_h2, [0.5, 0.5, 1.0]);
    }

    #[test]
    fn coarsening_stops_at_two_cells() {
        let (_, h) = hierarchy([4, 4, 4], 10);
        assert_eq!(h.depth(), 2);
        assert_eq!(h.levels[1].cells.len(), 8);
    }

    #[test]
    fn every_fine_cell_has_a_fluid_parent() {
        let (_, h) = hierarchy([5, 3, 4], 3);
        for pair in h.levels.windows(2) {
            let (fine, coarse) = (&pair[0], &pair[1]);
            assert_eq!(fine.parent.len(), fine.cells.len());
            for p in &fine.parent {
                assert!(coarse.cells.contains(p));
            }
        }
    }

    #[test]
    fn cycle_reduces_the_residual() {
        let (mesh, h) = hierarchy([8, 8, 8], 3);
        let rhs: Vec<f64> = (0..mesh.len()).map(|c| if mesh.is_interior(c) { 1.0 } else { 0.0 }).collect();
        let mut phi = vec![0.0; mesh.len()];
        let norm = |phi: &[f64]| -> f64 {
            h.levels[0]
                .cells
                .iter()
                .map(|&c| (h.levels[0].stencil.laplacian(phi, c) - rhs[c]).powi(2))
                .sum::<f64>()
        };
        let mut last = norm(&phi);
        for _ in 0..5 {
            h.cycle(&mut phi, &rhs, 2, 2);
            let now = norm(&phi);
            assert!(now < last, "residual rose from {last} to {now}");
            last = now;
        }
    }
}
