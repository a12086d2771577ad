//! Reusable initial fields and configuration documents.
//!
//! - [`rotational_field`]: solid-body rotation `u = (−y, x, 0)`,
//!   divergence free.
//! - [`shear_field`]: `u = (A·sin(π(y − y₀)/L), 0, 0)`, vanishing on the
//!   y walls.
//! - [`random_field`]: seeded noise for property tests and benches.

use eddy_grid::{FluidField, FluidMask, GridTopology};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random source for fixtures.
pub struct SeededRng {
    rng: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform in `[lo, hi)`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Constant velocity and pressure on every fluid cell.
pub fn uniform_field(mask: &FluidMask, velocity: [f64; 3], pressure: f64) -> FluidField {
    FluidField::initialize(mask, velocity, pressure)
}

/// Solid-body rotation about the z axis through the origin.
pub fn rotational_field(topology: &GridTopology, mask: &FluidMask) -> FluidField {
    FluidField::from_fn(topology, mask, |[x, y, _]| ([-y, x, 0.0], 0.0))
}

/// Plane shear flow along x, zero at both y faces of the domain.
pub fn shear_field(topology: &GridTopology, mask: &FluidMask, amplitude: f64) -> FluidField {
    let y0 = topology.domain().min()[1];
    let ly = topology.domain().max()[1] - y0;
    FluidField::from_fn(topology, mask, |[_, y, _]| {
        let s = (std::f64::consts::PI * (y - y0) / ly).sin();
        ([amplitude * s, 0.0, 0.0], 0.0)
    })
}

/// Velocity components and pressure uniform in `[-amplitude, amplitude)`.
pub fn random_field(
    topology: &GridTopology,
    mask: &FluidMask,
    seed: u64,
    amplitude: f64,
) -> FluidField {
    let mut rng = SeededRng::new(seed);
    FluidField::from_fn(topology, mask, |_| {
        let u = [
            rng.uniform(-amplitude, amplitude),
            rng.uniform(-amplitude, amplitude),
            rng.uniform(-amplitude, amplitude),
        ];
        (u, rng.uniform(-amplitude, amplitude))
    })
}

/// An 8³ lid-driven cavity on the unit cube.
pub const CAVITY_JSON: &str = r#"{
  "domain_definition": {
    "min_x": 0.0, "max_x": 1.0,
    "min_y": 0.0, "max_y": 1.0,
    "min_z": 0.0, "max_z": 1.0,
    "nx": 8, "ny": 8, "nz": 8
  },
  "ghost_rules": {
    "boundary_faces": ["x_min", "x_max", "y_min", "y_max", "z_min", "z_max"],
    "default_type": "dirichlet",
    "face_types": {}
  },
  "boundary_conditions": [
    {
      "role": "wall",
      "type": "dirichlet",
      "apply_to": ["velocity"],
      "apply_faces": ["x_min", "x_max", "y_min", "z_min", "z_max"],
      "velocity": [0.0, 0.0, 0.0]
    },
    {
      "role": "lid",
      "type": "dirichlet",
      "apply_to": ["velocity"],
      "apply_faces": ["y_max"],
      "velocity": [1.0, 0.0, 0.0]
    }
  ],
  "fluid_properties": { "density": 1.0, "viscosity": 0.01 },
  "initial_conditions": {
    "initial_velocity": [0.0, 0.0, 0.0],
    "initial_pressure": 0.0
  },
  "simulation_parameters": {
    "time_step": 0.01,
    "total_time": 0.05,
    "output_interval": 0.01
  },
  "solver": {
    "omega": 1.5,
    "max_iterations": 200,
    "tolerance": 1e-6,
    "relaxation": "sor",
    "advection_scheme": "upwind",
    "verbosity": "quiet"
  }
}"#;

/// A 4×3×3 channel with a solid cell at interior `(1, 1, 1)`: inflow on
/// `x_min`, zero-gradient outflow on `x_max`, walls elsewhere.
pub const CHANNEL_JSON: &str = r#"{
  "domain_definition": {
    "min_x": 0.0, "max_x": 4.0,
    "min_y": 0.0, "max_y": 3.0,
    "min_z": 0.0, "max_z": 3.0,
    "nx": 4, "ny": 3, "nz": 3
  },
  "ghost_rules": {
    "boundary_faces": ["x_min", "x_max", "y_min", "y_max", "z_min", "z_max"],
    "default_type": "dirichlet",
    "face_types": { "x_max": "neumann" }
  },
  "boundary_conditions": [
    {
      "role": "wall",
      "apply_to": ["velocity"],
      "apply_faces": ["y_min", "y_max", "z_min", "z_max"],
      "velocity": [0.0, 0.0, 0.0]
    },
    {
      "role": "inlet",
      "type": "dirichlet",
      "apply_to": ["velocity", "pressure"],
      "apply_faces": ["x_min"],
      "velocity": [0.5, 0.0, 0.0],
      "pressure": 1.0
    },
    {
      "role": "outlet",
      "apply_to": ["velocity", "pressure"],
      "apply_faces": ["x_max"]
    }
  ],
  "fluid_properties": { "density": 1.0, "viscosity": 0.05 },
  "initial_conditions": {
    "initial_velocity": [0.5, 0.0, 0.0],
    "initial_pressure": 0.0
  },
  "simulation_parameters": { "time_step": 0.05 },
  "geometry_definition": {
    "geometry_mask_flat": [
      1, 1, 1, 1,  1, 1, 1, 1,  1, 1, 1, 1,
      1, 1, 1, 1,  1, 0, 1, 1,  1, 1, 1, 1,
      1, 1, 1, 1,  1, 1, 1, 1,  1, 1, 1, 1
    ],
    "geometry_mask_shape": [4, 3, 3],
    "mask_encoding": { "fluid": 1, "solid": 0 },
    "flattening_order": "x-major"
  }
}"#;
