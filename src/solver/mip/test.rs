#![allow(non_snake_case)]
use super::*;
use crate::algebra::CscMatrix;
use crate::lu::LuError;
use crate::solver::simplex::*;

const INF: f64 = f64::INFINITY;

// max 5x0 + 4x1  s.t.  6x0 + 4x1 ≤ 24,  x0 + 2x1 ≤ 6,  x ≥ 0 integer
fn knapsack() -> BoundedLp<f64> {
    BoundedLp {
        A: CscMatrix::from_dense_rows(&[vec![6.0, 4.0], vec![1.0, 2.0]]),
        c: vec![-5.0, -4.0],
        lc: vec![-INF, -INF],
        uc: vec![24.0, 6.0],
        lx: vec![0.0, 0.0],
        ux: vec![INF, INF],
    }
}

fn run(
    lp: &BoundedLp<f64>,
    settings: &MipSettings,
    initial: Option<&[f64]>,
) -> MipResult {
    let simplex = SimplexSettings::<f64>::default();
    let solve = |l: &[f64],
                 u: &[f64],
                 warm: Option<&[VarStatus]>,
                 cb: &mut SolverCallbacks|
     -> Result<Relaxation, LuError> {
        let mut node = lp.clone();
        node.lx = l.to_vec();
        node.ux = u.to_vec();
        let sol = solve_lp(&node, &simplex, warm, &mut std::io::sink(), cb)?;
        Ok(match sol.status {
            SimplexStatus::Optimal => Relaxation {
                status: RelaxationStatus::Optimal,
                obj: sol.objective(&node.c),
                x: sol.x,
                basis: Some(sol.basis),
            },
            SimplexStatus::PrimalInfeasible => Relaxation::with_status(RelaxationStatus::Infeasible),
            SimplexStatus::DualInfeasible => Relaxation::with_status(RelaxationStatus::Unbounded),
            _ => Relaxation::with_status(RelaxationStatus::Failed),
        })
    };
    let integer = vec![true; lp.nvars()];
    let mut callbacks = SolverCallbacks::none();
    branch_and_bound(&integer, &lp.lx, &lp.ux, initial, settings, &mut callbacks, solve).unwrap()
}

#[test]
fn test_most_fractional() {
    let x = [0.5, 1.25, 2.0, 3.5];
    let int = [true, true, true, true];
    assert_eq!(most_fractional(&x, &int, 1e-5, 0), Some(0));
    // rotated tie breaking picks the other half-integral value
    assert_eq!(most_fractional(&x, &int, 1e-5, 3), Some(3));
    assert_eq!(most_fractional(&x, &[false, true, true, false], 1e-5, 0), Some(1));
    assert_eq!(most_fractional(&[1.0, 2.000001], &[true, true], 1e-5, 0), None);
}

#[test]
fn test_knapsack_both_orders() {
    for order in [NodeOrder::BestBound, NodeOrder::DepthFirst] {
        let settings = MipSettingsBuilder::default().node_order(order).build().unwrap();
        let result = run(&knapsack(), &settings, None);
        assert_eq!(result.status, MipStatus::Optimal);
        assert_eq!(result.termination, TerminationCode::Ok);
        let (x, obj) = result.incumbent.clone().unwrap();
        assert!((obj + 20.0).abs() < 1e-7);
        assert_eq!(x, vec![4.0, 0.0]);
        assert!(result.nodes >= 3);
        assert!(result.abs_gap() < 1e-7);
    }
}

#[test]
fn test_node_limit() {
    let settings = MipSettingsBuilder::default().max_nodes(Some(1)).build().unwrap();
    let result = run(&knapsack(), &settings, None);
    assert_eq!(result.termination, TerminationCode::MioMaxNodes);
    assert_eq!(result.status, MipStatus::Unknown);
    assert_eq!(result.nodes, 1);
    // the bound of the root relaxation is kept
    assert!((result.bound + 21.0).abs() < 1e-7);
}

#[test]
fn test_constructed_incumbent() {
    let settings = MipSettings::default();
    let result = run(&knapsack(), &settings, Some(&[2.0, 2.0]));
    assert_eq!(result.construct_obj, Some(-18.0));
    let (_, obj) = result.incumbent.unwrap();
    assert!(obj <= -18.0);
    assert!((obj + 20.0).abs() < 1e-7);
    assert!(result.num_int_solutions >= 2);
}

#[test]
fn test_integer_infeasible() {
    // 0.5 ≤ x0 + x1 ≤ 0.7 has no integer point
    let lp = BoundedLp {
        A: CscMatrix::from_dense_rows(&[vec![1.0, 1.0]]),
        c: vec![1.0, 1.0],
        lc: vec![0.5],
        uc: vec![0.7],
        lx: vec![0.0, 0.0],
        ux: vec![1.0, 1.0],
    };
    let result = run(&lp, &MipSettings::default(), None);
    assert_eq!(result.status, MipStatus::Infeasible);
    assert_eq!(result.root_status, Some(RelaxationStatus::Optimal));
    assert!(result.incumbent.is_none());
}
