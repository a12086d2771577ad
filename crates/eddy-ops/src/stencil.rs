//! Shared stencil helpers.
//!
//! Neighbour lookup on the padded grid and the finite-value clamp used
//! by the Poisson solver and the pressure corrector.

use eddy_core::Axis;
use eddy_grid::{FluidField, Mesh};

/// Magnitude non-finite potentials are clamped to.
pub(crate) const MAX_SAFE: f64 = f64::MAX / 10.0;

/// Replace a non-finite value with the nearest safe finite one.
///
/// NaN becomes zero; infinities keep their sign at [`MAX_SAFE`].
/// The flag reports whether a clamp happened.
#[inline]
pub(crate) fn clamp_finite(v: f64) -> (f64, bool) {
    if v.is_finite() {
        (v, false)
    } else if v.is_nan() {
        (0.0, true)
    } else {
        (MAX_SAFE.copysign(v), true)
    }
}

/// Velocities of the lower and upper neighbours of `idx` along `axis`.
///
/// A neighbour is usable when it holds a velocity: fluid cells always
/// do, ghosts do once enforced. Null cells yield `None`.
#[inline]
pub(crate) fn axis_velocities(
    mesh: &Mesh,
    field: &FluidField,
    idx: usize,
    axis: Axis,
) -> (Option<[f64; 3]>, Option<[f64; 3]>) {
    let lo = mesh.offset(idx, axis, -1).and_then(|n| field.velocity(n));
    let hi = mesh.offset(idx, axis, 1).and_then(|n| field.velocity(n));
    (lo, hi)
}

/// Central-difference gradient of a dense scalar at interior cell `idx`.
#[inline]
pub(crate) fn central_gradient(mesh: &Mesh, values: &[f64], idx: usize) -> [f64; 3] {
    let h = mesh.spacing();
    let mut g = [0.0; 3];
    for axis in Axis::ALL {
        let a = axis.index();
        let s = mesh.stride(axis);
        g[a] = (values[idx + s] - values[idx - s]) / (2.0 * h[a]);
    }
    g
}
