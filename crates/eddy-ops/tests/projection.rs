//! End-to-end checks of the projection operators on analytic cases.

use eddy_core::{CellDiagnostics, Relaxation};
use eddy_grid::FluidMask;
use eddy_ops::{
    BoundaryEnforcer, DivergenceOperator, MaskAndGhostBuilder, PoissonSolver, PressureCorrector,
    SolveStatus,
};
use eddy_test_utils::{cube, open_mask, rotational_field, symmetric_cube, walls, SeededRng};

// ----------------------------------------------------------------
// Poisson
// ----------------------------------------------------------------

#[test]
fn sor_recovers_quadratic_potential() {
    // ∇²(−|x − c|²) = −6, exact for the 7-point stencil.
    let topo = cube(10);
    let mesh = topo.mesh();
    let mask = open_mask(&topo);
    let exact = |c: usize| {
        let [x, y, z] = topo.cell_center(c);
        -((x - 5.0).powi(2) + (y - 5.0).powi(2) + (z - 5.0).powi(2))
    };
    let rhs = vec![-6.0; mesh.len()];
    let boundary: Vec<f64> = (0..mesh.len())
        .map(|c| if mask.is_fluid(c) { 0.0 } else { exact(c) })
        .collect();

    let solver = PoissonSolver::builder()
        .omega(1.7)
        .max_iterations(2000)
        .tolerance(None)
        .build()
        .unwrap();
    let sol = solver
        .solve_with_boundary(mesh, &mask, &rhs, boundary)
        .unwrap();
    assert_eq!(sol.report.iterations, 2000);
    assert_eq!(sol.report.status, SolveStatus::FixedIterations);

    let cells: Vec<usize> = mask.fluid_indices().collect();
    let n = cells.len() as f64;
    let mean_num = cells.iter().map(|&c| sol.phi[c]).sum::<f64>() / n;
    let mean_exact = cells.iter().map(|&c| exact(c)).sum::<f64>() / n;
    let mae = cells
        .iter()
        .map(|&c| ((sol.phi[c] - mean_num) - (exact(c) - mean_exact)).abs())
        .sum::<f64>()
        / n;
    assert!(mae < 0.05, "mean absolute error {mae}");
}

#[test]
fn zero_rhs_relaxes_random_guess() {
    let topo = cube(10);
    let mesh = topo.mesh();
    let mask = open_mask(&topo);
    let mut rng = SeededRng::new(42);
    let guess: Vec<f64> = (0..mesh.len())
        .map(|c| if mask.is_fluid(c) { rng.uniform(-1.0, 1.0) } else { 0.0 })
        .collect();
    let rhs = vec![0.0; mesh.len()];

    for relaxation in [Relaxation::Sor, Relaxation::RedBlack] {
        let sol = PoissonSolver::builder()
            .max_iterations(500)
            .tolerance(None)
            .relaxation(relaxation)
            .build()
            .unwrap()
            .solve_with_boundary(mesh, &mask, &rhs, guess.clone())
            .unwrap();
        assert!(
            sol.report.residual < 1e-6,
            "{relaxation:?} residual {}",
            sol.report.residual
        );
    }
}

#[test]
fn zero_rhs_from_zero_is_already_solved() {
    let topo = cube(6);
    let mesh = topo.mesh();
    let mask = open_mask(&topo);
    let sol = PoissonSolver::builder()
        .build()
        .unwrap()
        .solve(mesh, &mask, &vec![0.0; mesh.len()])
        .unwrap();
    assert_eq!(sol.report.status, SolveStatus::Converged);
    assert_eq!(sol.report.iterations, 1);
    assert!(sol.phi.iter().all(|&p| p == 0.0));
}

// ----------------------------------------------------------------
// Projection
// ----------------------------------------------------------------

#[test]
fn rotational_field_survives_projection() {
    let topo = symmetric_cube(8);
    let mesh = topo.mesh();
    let mask = open_mask(&topo);
    let field = rotational_field(&topo, &mask);
    let dt = 0.05;

    let div = DivergenceOperator::new().compute(mesh, &mask, &field).unwrap();
    assert!(div.stats().max_abs < 1e-12);
    let sol = PoissonSolver::builder()
        .build()
        .unwrap()
        .solve(mesh, &mask, &div.rhs(dt))
        .unwrap();
    let mut diag = CellDiagnostics::new(mesh.len());
    let out = PressureCorrector::builder()
        .dt(dt)
        .build()
        .unwrap()
        .correct(mesh, &mask, &field, &sol.phi, &mut diag)
        .unwrap();

    for idx in mask.fluid_indices() {
        let a = field.velocity(idx).unwrap();
        let b = out.field.velocity(idx).unwrap();
        for c in 0..3 {
            assert!((a[c] - b[c]).abs() < 1e-8, "cell {idx}: {a:?} vs {b:?}");
        }
    }
    assert!(out.divergence.stats().max_abs < 1e-8);
}

#[test]
fn enforced_walls_feed_divergence_stencil() {
    // A uniform stream against no-slip walls: enforcement zeroes the
    // boundary layer, so the stream now converges at the x walls.
    let topo = cube(4);
    let mesh = topo.mesh();
    let mask = open_mask(&topo);
    let (rules, conditions) = walls();
    let registry = MaskAndGhostBuilder::new(rules, &conditions)
        .unwrap()
        .build(&topo, &mask);
    let mut field = eddy_test_utils::uniform_field(&mask, [1.0, 0.0, 0.0], 0.0);
    let mut diag = CellDiagnostics::new(mesh.len());
    let report = BoundaryEnforcer::builder()
        .build()
        .unwrap()
        .enforce(&registry, &mut field, &mut diag);
    assert!(report.cells_influenced() > 0);

    let div = DivergenceOperator::new().compute(mesh, &mask, &field).unwrap();
    // Second interior x cell: left neighbour was zeroed by the x_min wall.
    let inner = div.get(mesh.index(2, 2, 2)).unwrap();
    assert!((inner - 0.5).abs() < 1e-12, "inner divergence {inner}");
    assert!(div.stats().max_abs > 0.0);
}

#[test]
fn solid_obstacle_keeps_null_cells_null() {
    let topo = cube(5);
    let mesh = topo.mesh();
    let mask = FluidMask::from_fn(mesh, |i, j, k| !(i == 2 && j == 2 && k == 2));
    let obstacle = mesh.index(3, 3, 3);
    let field = eddy_test_utils::random_field(&topo, &mask, 3, 0.5);
    let dt = 0.1;

    let div = DivergenceOperator::new().compute(mesh, &mask, &field).unwrap();
    assert_eq!(div.get(obstacle), None);
    let sol = PoissonSolver::builder()
        .max_iterations(50)
        .build()
        .unwrap()
        .solve(mesh, &mask, &div.rhs(dt))
        .unwrap();
    assert_eq!(sol.phi[obstacle], 0.0);
    let mut diag = CellDiagnostics::new(mesh.len());
    let out = PressureCorrector::builder()
        .dt(dt)
        .build()
        .unwrap()
        .correct(mesh, &mask, &field, &sol.phi, &mut diag)
        .unwrap();
    assert_eq!(out.field.velocity(obstacle), None);
    assert_eq!(out.field.pressure(obstacle), None);
}
