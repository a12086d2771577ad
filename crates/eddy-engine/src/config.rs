//! Simulation configuration documents.
//!
//! [`SimulationConfig`] mirrors the JSON layout a run is described in:
//! domain, ghost rules, boundary conditions, fluid properties, initial
//! conditions, timestep and optional geometry and solver tuning.
//! [`validate()`](SimulationConfig::validate) checks everything up
//! front so that a [`SolverStep`](crate::SolverStep) built from it
//! cannot fail on configuration later.

use serde::{Deserialize, Serialize};

use eddy_core::{
    resolve_condition, AdvectionScheme, BoundaryConditionSpec, ConfigError, Face, GhostRules,
    Relaxation, SolverConfig, Verbosity,
};
use eddy_grid::{Domain, FlatteningOrder, FluidField, FluidMask, GeometryMask, Mesh};
use eddy_ops::MaskAndGhostBuilder;

// ── Sections ───────────────────────────────────────────────────────

/// Physical bounds and resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainDefinition {
    /// Lower x bound.
    pub min_x: f64,
    /// Upper x bound.
    pub max_x: f64,
    /// Lower y bound.
    pub min_y: f64,
    /// Upper y bound.
    pub max_y: f64,
    /// Lower z bound.
    pub min_z: f64,
    /// Upper z bound.
    pub max_z: f64,
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Cells along z.
    pub nz: usize,
}

impl DomainDefinition {
    /// Validated [`Domain`].
    pub fn to_domain(&self) -> Result<Domain, ConfigError> {
        Domain::new(
            [self.min_x, self.min_y, self.min_z],
            [self.max_x, self.max_y, self.max_z],
            [self.nx, self.ny, self.nz],
        )
    }
}

/// Density and kinematic viscosity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidProperties {
    /// Density ρ.
    pub density: f64,
    /// Kinematic viscosity ν.
    pub viscosity: f64,
}

impl Default for FluidProperties {
    fn default() -> Self {
        let d = SolverConfig::default();
        Self {
            density: d.density,
            viscosity: d.viscosity,
        }
    }
}

/// Uniform starting state for fluid cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Velocity on every fluid cell.
    pub initial_velocity: [f64; 3],
    /// Pressure on every fluid cell.
    pub initial_pressure: f64,
}

/// Timestep and run length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Δt.
    pub time_step: f64,
    /// Simulated time to cover, if the host loops.
    #[serde(default)]
    pub total_time: Option<f64>,
    /// Simulated time between outputs, if the host writes any.
    #[serde(default)]
    pub output_interval: Option<f64>,
}

/// Integer codes used in a geometry mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskEncoding {
    /// Code for fluid cells.
    pub fluid: i64,
    /// Code for solid cells.
    pub solid: i64,
}

/// Flattened solid/fluid geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryDefinition {
    /// One code per interior cell.
    pub geometry_mask_flat: Vec<i64>,
    /// Interior shape `[nx, ny, nz]`.
    pub geometry_mask_shape: [usize; 3],
    /// Code meanings.
    pub mask_encoding: MaskEncoding,
    /// Flattening order of `geometry_mask_flat`.
    #[serde(default)]
    pub flattening_order: FlatteningOrder,
}

impl GeometryDefinition {
    fn to_mask(&self) -> GeometryMask {
        GeometryMask {
            values: self.geometry_mask_flat.clone(),
            shape: self.geometry_mask_shape,
            fluid_code: self.mask_encoding.fluid,
            order: self.flattening_order,
        }
    }
}

/// Optional solver tuning. Absent entries keep [`SolverConfig`] defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSection {
    /// SOR relaxation factor.
    pub omega: Option<f64>,
    /// Poisson iteration cap.
    pub max_iterations: Option<usize>,
    /// Poisson residual tolerance.
    pub tolerance: Option<f64>,
    /// Always run `max_iterations` sweeps, ignoring `tolerance`.
    pub fixed_iterations: bool,
    /// Poisson sweep ordering.
    pub relaxation: Option<Relaxation>,
    /// Convective discretisation.
    pub advection_scheme: Option<AdvectionScheme>,
    /// Ghost influence tolerance.
    pub influence_tolerance: Option<f64>,
    /// Logging verbosity.
    pub verbosity: Option<Verbosity>,
}

// ── SimulationConfig ───────────────────────────────────────────────

/// A complete run description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Domain bounds and resolution.
    pub domain_definition: DomainDefinition,
    /// Which faces get ghosts, and their types.
    pub ghost_rules: GhostRules,
    /// Conditions per face. Later entries win.
    pub boundary_conditions: Vec<BoundaryConditionSpec>,
    /// Density and viscosity.
    #[serde(default)]
    pub fluid_properties: FluidProperties,
    /// Starting state.
    #[serde(default)]
    pub initial_conditions: InitialConditions,
    /// Timestep and run length.
    pub simulation_parameters: SimulationParameters,
    /// Solid obstacles. Absent means an open box.
    #[serde(default)]
    pub geometry_definition: Option<GeometryDefinition>,
    /// Solver tuning.
    #[serde(default)]
    pub solver: SolverSection,
}

impl SimulationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Check the whole document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Domain bounds and resolution.
        let domain = self.domain()?;

        // 2. Each boundary condition on its own.
        for bc in &self.boundary_conditions {
            bc.validate()?;
        }

        // 3. Every declared face resolves to a complete condition.
        for face in Face::ALL {
            if self.ghost_rules.declares(face) {
                resolve_condition(face, &self.ghost_rules, &self.boundary_conditions)?;
            }
        }

        // 4. Geometry agrees with the domain and its encoding.
        if let Some(geometry) = &self.geometry_definition {
            let enc = &geometry.mask_encoding;
            if enc.fluid == enc.solid {
                return Err(invalid(
                    "mask_encoding",
                    format!("fluid and solid share code {}", enc.fluid),
                ));
            }
            let expected = domain.resolution().iter().product();
            if geometry.geometry_mask_shape != domain.resolution()
                || geometry.geometry_mask_flat.len() != expected
            {
                return Err(ConfigError::GeometryMismatch {
                    expected,
                    actual: geometry.geometry_mask_flat.len(),
                });
            }
            if let Some(bad) = geometry
                .geometry_mask_flat
                .iter()
                .find(|&&v| v != enc.fluid && v != enc.solid)
            {
                return Err(invalid(
                    "geometry_mask_flat",
                    format!("unknown cell code {bad}"),
                ));
            }
        }

        // 5. Initial state is finite.
        let ic = &self.initial_conditions;
        if !ic.initial_velocity.iter().all(|v| v.is_finite()) || !ic.initial_pressure.is_finite()
        {
            return Err(invalid(
                "initial_conditions",
                "initial velocity and pressure must be finite".to_string(),
            ));
        }

        // 6. Run length, when given.
        let params = &self.simulation_parameters;
        for (name, value) in [
            ("total_time", params.total_time),
            ("output_interval", params.output_interval),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(invalid(name, format!("must be finite and > 0, got {v}")));
                }
            }
        }

        // 7. Numeric tuning.
        self.solver_config().validate()
    }

    /// The validated domain.
    pub fn domain(&self) -> Result<Domain, ConfigError> {
        self.domain_definition.to_domain()
    }

    /// Typed solver parameters with defaults filled in.
    pub fn solver_config(&self) -> SolverConfig {
        let d = SolverConfig::default();
        let s = &self.solver;
        SolverConfig {
            dt: self.simulation_parameters.time_step,
            density: self.fluid_properties.density,
            viscosity: self.fluid_properties.viscosity,
            omega: s.omega.unwrap_or(d.omega),
            max_iterations: s.max_iterations.unwrap_or(d.max_iterations),
            tolerance: if s.fixed_iterations {
                None
            } else {
                s.tolerance.or(d.tolerance)
            },
            relaxation: s.relaxation.unwrap_or(d.relaxation),
            advection: s.advection_scheme.unwrap_or(d.advection),
            influence_tolerance: s.influence_tolerance.unwrap_or(d.influence_tolerance),
            verbosity: s.verbosity.unwrap_or(d.verbosity),
        }
    }

    /// The ghost builder for these rules and conditions.
    pub fn ghost_builder(&self) -> Result<MaskAndGhostBuilder, ConfigError> {
        MaskAndGhostBuilder::new(self.ghost_rules.clone(), &self.boundary_conditions)
    }

    /// Fluid mask from the geometry, or all fluid without one.
    pub fn fluid_mask(&self, mesh: &Mesh) -> Result<FluidMask, ConfigError> {
        match &self.geometry_definition {
            Some(geometry) => FluidMask::from_geometry(mesh, &geometry.to_mask()),
            None => Ok(FluidMask::all_fluid(mesh)),
        }
    }

    /// Initial field over `mask`.
    pub fn initial_field(&self, mask: &FluidMask) -> FluidField {
        FluidField::initialize(
            mask,
            self.initial_conditions.initial_velocity,
            self.initial_conditions.initial_pressure,
        )
    }

    /// Steps needed to cover `total_time`, if set.
    pub fn step_count(&self) -> Option<u64> {
        let total = self.simulation_parameters.total_time?;
        Some((total / self.simulation_parameters.time_step).round() as u64)
    }
}

fn invalid(name: &str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}
