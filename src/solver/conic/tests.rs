#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::callbacks::SolverCallbacks;

fn run(
    P: CscMatrix<f64>,
    q: &[f64],
    A: CscMatrix<f64>,
    b: &[f64],
    cones: &[SupportedConeT<f64>],
) -> ConicSolver<f64> {
    let mut solver = ConicSolver::new(&P, q, &A, b, cones, ConicSettings::default()).unwrap();
    let mut sink = std::io::sink();
    solver.solve(&mut sink, &mut SolverCallbacks::none());
    solver
}

#[test]
fn test_lp_lower_bound() {
    // min x  s.t. x ≥ 1
    let A = CscMatrix::from_dense_rows(&[vec![-1.]]);
    let solver = run(CscMatrix::zeros((1, 1)), &[1.], A, &[-1.], &[SupportedConeT::NonnegativeConeT(1)]);

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.x[0] - 1.).abs() < 1e-6);
    assert!((solver.solution.obj_val - 1.).abs() < 1e-6);
    // dual of x ≥ 1 is the unit cost
    assert!((solver.solution.z[0] - 1.).abs() < 1e-6);
}

#[test]
fn test_qp_with_equality() {
    // min ½(x₀² + x₁²)  s.t. x₀ + x₁ = 2
    let P = CscMatrix::<f64>::identity(2);
    let A = CscMatrix::from_dense_rows(&[vec![1., 1.]]);
    let solver = run(P, &[0., 0.], A, &[2.], &[SupportedConeT::ZeroConeT(1)]);

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.x[0] - 1.).abs() < 1e-6);
    assert!((solver.solution.x[1] - 1.).abs() < 1e-6);
    assert!((solver.solution.obj_val - 1.).abs() < 1e-6);
}

#[test]
fn test_socp_norm_bound() {
    // min t  s.t. (t, 1, 1) ∈ SOC
    let A = CscMatrix::from_dense_rows(&[vec![-1.], vec![0.], vec![0.]]);
    let solver = run(
        CscMatrix::zeros((1, 1)),
        &[1.],
        A,
        &[0., 1., 1.],
        &[SupportedConeT::SecondOrderConeT(3)],
    );

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.x[0] - f64::sqrt(2.)).abs() < 1e-6);
}

#[test]
fn test_exp_cone_log_bound() {
    // max x  s.t. (x, 1, e) in the exponential cone, i.e. eˣ ≤ e
    let A = CscMatrix::from_dense_rows(&[vec![-1.], vec![0.], vec![0.]]);
    let solver = run(
        CscMatrix::zeros((1, 1)),
        &[-1.],
        A,
        &[0., 1., std::f64::consts::E],
        &[SupportedConeT::ExponentialConeT()],
    );

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.x[0] - 1.).abs() < 1e-5);
}

#[test]
fn test_primal_infeasible() {
    // x ≥ 1 and x ≤ 0
    let A = CscMatrix::from_dense_rows(&[vec![-1.], vec![1.]]);
    let solver = run(
        CscMatrix::zeros((1, 1)),
        &[1.],
        A,
        &[-1., 0.],
        &[SupportedConeT::NonnegativeConeT(2)],
    );

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
    assert!(solver.solution.status.is_infeasible());
}

#[test]
fn test_dual_infeasible() {
    // min -x  s.t. x ≥ 0
    let A = CscMatrix::from_dense_rows(&[vec![-1.]]);
    let solver = run(
        CscMatrix::zeros((1, 1)),
        &[-1.],
        A,
        &[0.],
        &[SupportedConeT::NonnegativeConeT(1)],
    );

    assert_eq!(solver.solution.status, SolverStatus::DualInfeasible);
}

#[test]
fn test_callback_terminates() {
    let A = CscMatrix::from_dense_rows(&[vec![-1.]]);
    let mut solver = ConicSolver::new(
        &CscMatrix::zeros((1, 1)),
        &[1.],
        &A,
        &[-1.],
        &[SupportedConeT::NonnegativeConeT(1)],
        ConicSettings::default(),
    )
    .unwrap();

    let mut stop = |_: &crate::solver::callbacks::Progress| 1;
    let mut callbacks = SolverCallbacks::new(Some(&mut stop));
    solver.solve(&mut std::io::sink(), &mut callbacks);
    assert_eq!(solver.solution.status, SolverStatus::CallbackTerminated);
}

#[test]
fn test_bad_dimensions() {
    let A = CscMatrix::from_dense_rows(&[vec![-1.]]);
    let P = CscMatrix::<f64>::zeros((1, 1));

    let err = ConicSolver::new(&P, &[1.], &A, &[-1.], &[SupportedConeT::NonnegativeConeT(2)], ConicSettings::default());
    assert!(matches!(err, Err(ConicSolverError::IncompatibleConeDimension)));

    let err = ConicSolver::new(&P, &[1., 2.], &A, &[-1.], &[SupportedConeT::NonnegativeConeT(1)], ConicSettings::default());
    assert!(matches!(err, Err(ConicSolverError::IncompatibleDimension)));
}
