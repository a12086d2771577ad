//! Integration test: runs described by JSON documents.

use eddy_core::{ConfigError, Face, MutationSource, StepError};
use eddy_engine::{Phase, SimulationConfig, SolverStep};
use eddy_ops::CellKind;
use eddy_test_utils::{CAVITY_JSON, CHANNEL_JSON};

#[test]
fn cavity_document_runs_to_completion() {
    let sim = SimulationConfig::from_json_str(CAVITY_JSON).unwrap();
    let steps = sim.step_count().unwrap();
    assert_eq!(steps, 5);

    let (mut solver, mut field) = SolverStep::from_simulation(&sim).unwrap();
    assert_eq!(solver.registry().len(), 6 * 64);
    for _ in 0..steps {
        let out = solver.advance(&field).unwrap();
        assert_eq!(out.report.phases, Phase::SEQUENCE.to_vec());
        assert!(out.report.poisson.iterations <= 200);
        field = out.field;
    }
    assert_eq!(solver.step_id().0, steps);
}

#[test]
fn channel_document_respects_obstacle_and_outlet() {
    let sim = SimulationConfig::from_json_str(CHANNEL_JSON).unwrap();
    let (mut solver, field) = SolverStep::from_simulation(&sim).unwrap();
    let mesh = solver.mesh().clone();
    let obstacle = mesh.index(2, 2, 2);
    assert!(!solver.mask().is_fluid(obstacle));
    assert_eq!(
        solver.registry().classify(solver.mask(), obstacle),
        CellKind::Solid
    );

    let outlet = solver.registry().on_face(Face::XMax).next().unwrap().clone();
    assert_eq!(outlet.role.as_deref(), Some("outlet"));

    let out = solver.advance(&field).unwrap();
    assert_eq!(out.field.velocity(obstacle), None);
    // Neumann ghost mirrors its origin after the post-correction pass.
    assert_eq!(
        out.field.velocity(outlet.cell),
        out.field.velocity(outlet.origin)
    );
    // Inlet pressure is held on its origin cells.
    let inlet = solver.registry().on_face(Face::XMin).next().unwrap();
    let p = out.field.pressure(inlet.origin).unwrap();
    assert!((p - 1.0).abs() <= 1e-6);
    assert_eq!(
        out.report.diagnostics.mutation_source(inlet.cell),
        Some(MutationSource::BoundaryEnforcement)
    );
}

#[test]
fn missing_face_condition_is_fatal() {
    let doc = CAVITY_JSON.replace(
        "\"apply_faces\": [\"x_min\", \"x_max\", \"y_min\", \"z_min\", \"z_max\"]",
        "\"apply_faces\": [\"x_min\", \"x_max\", \"y_min\", \"z_min\"]",
    );
    assert_eq!(
        SimulationConfig::from_json_str(&doc).unwrap_err(),
        ConfigError::MissingBoundaryCondition { face: Face::ZMax }
    );
}

#[test]
fn missing_dirichlet_value_is_fatal_at_solver_construction() {
    let mut sim = SimulationConfig::from_json_str(CAVITY_JSON).unwrap();
    sim.boundary_conditions[1].velocity = None;
    match SolverStep::from_simulation(&sim) {
        Err(StepError::Config(ConfigError::MissingDirichletValue { face, .. })) => {
            assert_eq!(face, Face::YMax)
        }
        Err(other) => panic!("expected MissingDirichletValue, got {other:?}"),
        Ok(_) => panic!("expected MissingDirichletValue, got a solver"),
    }
}
