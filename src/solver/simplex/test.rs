use super::*;
use crate::solver::callbacks::{Progress, SolverCallbacks};

const INF: f64 = f64::INFINITY;

// maximize 3x0 + x1 + 5x2 + x3 as a minimization
fn lo1() -> BoundedLp<f64> {
    BoundedLp {
        A: CscMatrix::from_dense_rows(&[
            vec![3., 1., 2., 0.],
            vec![2., 1., 3., 1.],
            vec![0., 2., 0., 3.],
        ]),
        c: vec![-3., -1., -5., -1.],
        lc: vec![30., 15., -INF],
        uc: vec![30., INF, 25.],
        lx: vec![0., 0., 0., 0.],
        ux: vec![INF, 10., INF, INF],
    }
}

fn run(lp: &BoundedLp<f64>, settings: &SimplexSettings<f64>, warm: Option<&[VarStatus]>) -> SimplexSolution<f64> {
    solve_lp(lp, settings, warm, &mut std::io::sink(), &mut SolverCallbacks::none()).unwrap()
}

fn check_optimality(lp: &BoundedLp<f64>, sol: &SimplexSolution<f64>) {
    let n = lp.nvars();
    // dual feasibility of the reduced costs at the final basis
    for j in 0..n {
        match sol.basis[j] {
            VarStatus::Basic => assert!(sol.d[j].abs() < 1e-8),
            VarStatus::AtLower => assert!(sol.d[j] > -1e-8),
            VarStatus::AtUpper => assert!(sol.d[j] < 1e-8),
            _ => {}
        }
    }
    for (i, &yi) in sol.y.iter().enumerate() {
        match sol.basis[n + i] {
            VarStatus::Basic => assert!(yi.abs() < 1e-8),
            VarStatus::AtLower => assert!(yi > -1e-8),
            VarStatus::AtUpper => assert!(yi < 1e-8),
            _ => {}
        }
    }
}

#[test]
fn test_lo1_optimal() {
    let lp = lo1();
    let sol = run(&lp, &SimplexSettings::default(), None);

    assert_eq!(sol.status, SimplexStatus::Optimal);
    assert!(sol.primal_feasible);
    assert!((sol.objective(&lp.c) + 250. / 3.).abs() < 1e-9);
    assert!((sol.x[2] - 15.).abs() < 1e-9);
    assert!((sol.x[3] - 25. / 3.).abs() < 1e-9);

    let mut r = vec![0.; 3];
    lp.A.gemv(&mut r, &sol.x, 1., 0.);
    assert!(r.norm_inf_diff(&sol.r) < 1e-9);
    check_optimality(&lp, &sol);
}

#[test]
fn test_pricing_rules_agree() {
    let lp = lo1();
    let bland = SimplexSettingsBuilder::default()
        .pricing(PricingRule::Bland)
        .build()
        .unwrap();
    let eager = SimplexSettingsBuilder::default()
        .refactor_freq(1)
        .degen_switch(1)
        .build()
        .unwrap();

    let s1 = run(&lp, &bland, None);
    let s2 = run(&lp, &eager, None);
    assert_eq!(s1.status, SimplexStatus::Optimal);
    assert_eq!(s2.status, SimplexStatus::Optimal);
    assert!((s1.objective(&lp.c) - s2.objective(&lp.c)).abs() < 1e-9);
}

#[test]
fn test_warm_start_from_optimal_basis() {
    let lp = lo1();
    let settings = SimplexSettings::default();
    let cold = run(&lp, &settings, None);
    assert!(cold.iterations > 0);

    let warm = run(&lp, &settings, Some(&cold.basis));
    assert_eq!(warm.status, SimplexStatus::Optimal);
    assert_eq!(warm.iterations, 0);
    assert!((warm.objective(&lp.c) - cold.objective(&lp.c)).abs() < 1e-9);
}

#[test]
fn test_conflicting_equalities_farkas() {
    // x0 + x1 = 1 and x0 + x1 = 2
    let lp = BoundedLp {
        A: CscMatrix::from_dense_rows(&[vec![1., 1.], vec![1., 1.]]),
        c: vec![1., 1.],
        lc: vec![1., 2.],
        uc: vec![1., 2.],
        lx: vec![0., 0.],
        ux: vec![INF, INF],
    };
    let sol = run(&lp, &SimplexSettings::default(), None);
    assert_eq!(sol.status, SimplexStatus::PrimalInfeasible);

    // y with Aᵀy + slx = 0, slx ≥ 0 and lcᵀy⁺ - ucᵀy⁻ > 0
    let y = sol.ray.unwrap();
    let mut aty = vec![0.; 2];
    lp.A.t().gemv(&mut aty, &y, 1., 0.);
    assert!(aty.iter().all(|&v| v < 1e-9));
    let value: f64 = y
        .iter()
        .enumerate()
        .map(|(i, &yi)| if yi > 0. { lp.lc[i] * yi } else { lp.uc[i] * yi })
        .sum();
    assert!(value > 1e-9);
}

#[test]
fn test_unbounded_ray() {
    // min -x0  s.t. x0 - x1 ≤ 1, x ≥ 0
    let lp = BoundedLp {
        A: CscMatrix::from_dense_rows(&[vec![1., -1.]]),
        c: vec![-1., 0.],
        lc: vec![-INF],
        uc: vec![1.],
        lx: vec![0., 0.],
        ux: vec![INF, INF],
    };
    let sol = run(&lp, &SimplexSettings::default(), None);
    assert_eq!(sol.status, SimplexStatus::DualInfeasible);

    let ray = sol.ray.unwrap();
    assert!(lp.c.dot(&ray) < 0.);
    assert!(ray.iter().all(|&v| v >= -1e-12));
    assert!(ray[0] - ray[1] <= 1e-12);
}

#[test]
fn test_free_and_boxed_variables() {
    // min x0 - x1  s.t. -2 ≤ x0 + x1 ≤ 4, x0 free, -1 ≤ x1 ≤ 3
    let lp = BoundedLp {
        A: CscMatrix::from_dense_rows(&[vec![1., 1.]]),
        c: vec![1., -1.],
        lc: vec![-2.],
        uc: vec![4.],
        lx: vec![-INF, -1.],
        ux: vec![INF, 3.],
    };
    let sol = run(&lp, &SimplexSettings::default(), None);
    assert_eq!(sol.status, SimplexStatus::Optimal);
    assert!((sol.x[1] - 3.).abs() < 1e-9);
    assert!((sol.x[0] + 5.).abs() < 1e-9);
    check_optimality(&lp, &sol);
}

#[test]
fn test_iteration_limit_and_callback() {
    let lp = lo1();
    let settings = SimplexSettingsBuilder::default().max_iter(0).build().unwrap();
    let sol = run(&lp, &settings, None);
    assert_eq!(sol.status, SimplexStatus::MaxIterations);

    let mut stop = |_: &Progress| 1;
    let mut callbacks = SolverCallbacks::new(Some(&mut stop));
    let sol = solve_lp(&lp, &SimplexSettings::default(), None, &mut std::io::sink(), &mut callbacks).unwrap();
    assert_eq!(sol.status, SimplexStatus::CallbackTerminated);
}
