//! Boundary-condition and ghost-rule records.
//!
//! These are read-only inputs: they describe *what* each domain face
//! imposes, and are consumed by the ghost builder in `eddy-ops`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::face::Face;

/// Boundary-condition type carried by a ghost cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Fixed value: the ghost holds a prescribed constant.
    Dirichlet,
    /// Zero gradient: the ghost copies its interior neighbour.
    Neumann,
}

/// A physical quantity a boundary condition applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// The three-component velocity vector.
    Velocity,
    /// The scalar pressure.
    Pressure,
}

/// Which faces receive ghost cells, and their default boundary type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostRules {
    /// Faces that get a ghost layer. Faces not listed get none.
    pub boundary_faces: Vec<Face>,
    /// Type used for faces missing from `face_types`.
    pub default_type: BoundaryKind,
    /// Per-face type overrides.
    #[serde(default)]
    pub face_types: IndexMap<Face, BoundaryKind>,
}

impl GhostRules {
    /// Ghost rules that declare all six faces with a single type.
    pub fn all_faces(default_type: BoundaryKind) -> Self {
        Self {
            boundary_faces: Face::ALL.to_vec(),
            default_type,
            face_types: IndexMap::new(),
        }
    }

    /// Whether `face` is declared as a boundary face.
    pub fn declares(&self, face: Face) -> bool {
        self.boundary_faces.contains(&face)
    }

    /// The rule-level boundary type for `face`.
    pub fn kind_for(&self, face: Face) -> BoundaryKind {
        self.face_types
            .get(&face)
            .copied()
            .unwrap_or(self.default_type)
    }
}

/// One boundary-condition entry from the domain configuration.
///
/// A single entry may cover several faces. When two entries name the
/// same face, the later entry wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditionSpec {
    /// Faces this condition applies to.
    pub apply_faces: Vec<Face>,
    /// Quantities this condition constrains.
    pub apply_to: Vec<Quantity>,
    /// Condition type. `None` defers to the face's [`GhostRules`] type.
    #[serde(rename = "type", default)]
    pub kind: Option<BoundaryKind>,
    /// Prescribed velocity for Dirichlet conditions.
    #[serde(default)]
    pub velocity: Option<[f64; 3]>,
    /// Prescribed pressure for Dirichlet conditions.
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Free-form label such as `"wall"` or `"inlet"`.
    #[serde(default)]
    pub role: Option<String>,
}

impl BoundaryConditionSpec {
    /// A no-slip wall: Dirichlet zero velocity on `faces`.
    pub fn no_slip(faces: &[Face]) -> Self {
        Self {
            apply_faces: faces.to_vec(),
            apply_to: vec![Quantity::Velocity],
            kind: Some(BoundaryKind::Dirichlet),
            velocity: Some([0.0; 3]),
            pressure: None,
            role: Some("wall".to_string()),
        }
    }

    /// Zero-gradient velocity and pressure on `faces`.
    pub fn zero_gradient(faces: &[Face]) -> Self {
        Self {
            apply_faces: faces.to_vec(),
            apply_to: vec![Quantity::Velocity, Quantity::Pressure],
            kind: Some(BoundaryKind::Neumann),
            velocity: None,
            pressure: None,
            role: Some("outlet".to_string()),
        }
    }

    /// Whether this condition constrains `quantity`.
    pub fn applies_to(&self, quantity: Quantity) -> bool {
        self.apply_to.contains(&quantity)
    }

    /// Check the record is structurally sound.
    ///
    /// Dirichlet completeness is checked per face by
    /// [`resolve_condition`] because the effective type may come from
    /// the ghost rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.apply_faces.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "apply_faces".to_string(),
                reason: "boundary condition names no faces".to_string(),
            });
        }
        if self.apply_to.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "apply_to".to_string(),
                reason: "boundary condition constrains no quantity".to_string(),
            });
        }
        if let Some(v) = self.velocity {
            if v.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: "velocity".to_string(),
                    reason: format!("prescribed velocity must be finite, got {v:?}"),
                });
            }
        }
        if let Some(p) = self.pressure {
            if !p.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "pressure".to_string(),
                    reason: format!("prescribed pressure must be finite, got {p}"),
                });
            }
        }
        Ok(())
    }
}

/// The condition in force on one face after resolving types.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCondition {
    /// Effective boundary type.
    pub kind: BoundaryKind,
    /// Prescribed velocity, present iff velocity is Dirichlet-enforced.
    pub velocity: Option<[f64; 3]>,
    /// Prescribed pressure, present iff pressure is Dirichlet-enforced.
    pub pressure: Option<f64>,
    /// Whether the condition constrains velocity.
    pub apply_velocity: bool,
    /// Whether the condition constrains pressure.
    pub apply_pressure: bool,
    /// Label copied from the condition.
    pub role: Option<String>,
}

/// Resolve the condition governing `face`.
///
/// Fails with [`ConfigError::MissingBoundaryCondition`] when no entry
/// names the face, and [`ConfigError::MissingDirichletValue`] when a
/// Dirichlet condition constrains a quantity without a value for it.
pub fn resolve_condition(
    face: Face,
    rules: &GhostRules,
    conditions: &[BoundaryConditionSpec],
) -> Result<ResolvedCondition, ConfigError> {
    let spec = conditions
        .iter()
        .rev()
        .find(|bc| bc.apply_faces.contains(&face))
        .ok_or(ConfigError::MissingBoundaryCondition { face })?;
    spec.validate()?;

    let kind = spec.kind.unwrap_or_else(|| rules.kind_for(face));
    let apply_velocity = spec.applies_to(Quantity::Velocity);
    let apply_pressure = spec.applies_to(Quantity::Pressure);

    let (velocity, pressure) = match kind {
        BoundaryKind::Dirichlet => {
            let velocity = if apply_velocity {
                Some(spec.velocity.ok_or(ConfigError::MissingDirichletValue {
                    face,
                    quantity: Quantity::Velocity,
                })?)
            } else {
                None
            };
            let pressure = if apply_pressure {
                Some(spec.pressure.ok_or(ConfigError::MissingDirichletValue {
                    face,
                    quantity: Quantity::Pressure,
                })?)
            } else {
                None
            };
            (velocity, pressure)
        }
        BoundaryKind::Neumann => (None, None),
    };

    Ok(ResolvedCondition {
        kind,
        velocity,
        pressure,
        apply_velocity,
        apply_pressure,
        role: spec.role.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inlet(faces: &[Face]) -> BoundaryConditionSpec {
        BoundaryConditionSpec {
            apply_faces: faces.to_vec(),
            apply_to: vec![Quantity::Velocity, Quantity::Pressure],
            kind: Some(BoundaryKind::Dirichlet),
            velocity: Some([1.0, 0.0, 0.0]),
            pressure: Some(2.0),
            role: Some("inlet".to_string()),
        }
    }

    #[test]
    fn face_types_override_default() {
        let mut rules = GhostRules::all_faces(BoundaryKind::Dirichlet);
        rules.face_types.insert(Face::XMax, BoundaryKind::Neumann);
        assert_eq!(rules.kind_for(Face::XMax), BoundaryKind::Neumann);
        assert_eq!(rules.kind_for(Face::XMin), BoundaryKind::Dirichlet);
        assert!(rules.declares(Face::ZMax));
    }

    #[test]
    fn missing_condition_is_config_error() {
        let rules = GhostRules::all_faces(BoundaryKind::Dirichlet);
        let err = resolve_condition(Face::YMin, &rules, &[inlet(&[Face::XMin])]).unwrap_err();
        assert_eq!(err, ConfigError::MissingBoundaryCondition { face: Face::YMin });
    }

    #[test]
    fn missing_dirichlet_value_is_config_error() {
        let rules = GhostRules::all_faces(BoundaryKind::Dirichlet);
        let mut bc = inlet(&[Face::XMin]);
        bc.pressure = None;
        let err = resolve_condition(Face::XMin, &rules, &[bc]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDirichletValue {
                face: Face::XMin,
                quantity: Quantity::Pressure,
            }
        );
    }

    #[test]
    fn later_entry_wins() {
        let rules = GhostRules::all_faces(BoundaryKind::Dirichlet);
        let conditions = [inlet(&[Face::XMin]), BoundaryConditionSpec::no_slip(&[Face::XMin])];
        let resolved = resolve_condition(Face::XMin, &rules, &conditions).unwrap();
        assert_eq!(resolved.velocity, Some([0.0; 3]));
        assert!(!resolved.apply_pressure);
    }

    #[test]
    fn untyped_condition_uses_rule_type() {
        let rules = GhostRules::all_faces(BoundaryKind::Neumann);
        let mut bc = BoundaryConditionSpec::zero_gradient(&[Face::ZMax]);
        bc.kind = None;
        let resolved = resolve_condition(Face::ZMax, &rules, &[bc]).unwrap();
        assert_eq!(resolved.kind, BoundaryKind::Neumann);
        assert_eq!(resolved.velocity, None);
        assert!(resolved.apply_velocity);
    }

    #[test]
    fn non_finite_prescribed_value_rejected() {
        let mut bc = inlet(&[Face::XMin]);
        bc.velocity = Some([f64::NAN, 0.0, 0.0]);
        assert!(matches!(
            bc.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn deserializes_configuration_layout() {
        let json = r#"{
            "apply_faces": ["x_min", "x_max"],
            "apply_to": ["velocity"],
            "type": "dirichlet",
            "velocity": [0.0, 0.0, 0.0],
            "role": "wall"
        }"#;
        let bc: BoundaryConditionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(bc.apply_faces, vec![Face::XMin, Face::XMax]);
        assert_eq!(bc.kind, Some(BoundaryKind::Dirichlet));
        assert_eq!(bc.pressure, None);
    }
}
