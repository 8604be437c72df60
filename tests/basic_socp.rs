use conicopt::*;

const INF: f64 = f64::INFINITY;

// min ½xᵀPx + cᵀx  s.t.  -0.5 ≤ x ≤ 0.5,  -x ∈ Q³
// with t = -x carried by three extra variables
fn basic_socp_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();

    let rows: Vec<Vec<f64>> = (0..3)
        .map(|i| {
            let mut row = vec![0.; 6];
            row[i] = 1.;
            row[i + 3] = 1.;
            row
        })
        .collect();
    task.input_data_dense(
        &[0.1, -2.0, 1.0, 0., 0., 0.],
        0.,
        &rows,
        &[BoundKey::Fixed; 3],
        &[0.; 3],
        &[0.; 3],
        &[
            BoundKey::Range,
            BoundKey::Range,
            BoundKey::Range,
            BoundKey::Free,
            BoundKey::Free,
            BoundKey::Free,
        ],
        &[-0.5, -0.5, -0.5, -INF, -INF, -INF],
        &[0.5, 0.5, 0.5, INF, INF, INF],
    )
    .unwrap();

    // lower triangle of a positive definite P
    task.put_q_obj(
        &[0, 1, 2, 1, 2, 2],
        &[0, 0, 0, 1, 1, 2],
        &[
            1.4652521089139698,
            0.6137176286085666,
            -1.1527861771130112,
            2.219109946678485,
            -1.4400420548730628,
            1.6014483534926371,
        ],
    )
    .unwrap();
    task.append_cone(ConeType::Quadratic, &[3, 4, 5]).unwrap();
    task
}

#[test]
fn test_socp_feasible() {
    let env = Env::new();
    let mut task = basic_socp_task(&env);

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::Ok);
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);

    let x = task.get_xx(SolutionType::Interior).unwrap();
    let refsol = [-0.5, 0.435603, -0.245459];
    for (x, r) in x.iter().zip(refsol) {
        assert!((x - r).abs() <= 1e-4);
    }

    let refobj = -8.4590e-01;
    assert!((task.get_primal_obj(SolutionType::Interior).unwrap() - refobj).abs() <= 1e-4);
    assert!((task.get_dual_obj(SolutionType::Interior).unwrap() - refobj).abs() <= 1e-4);

    let info = task.get_solution_info(SolutionType::Interior).unwrap();
    assert!(info.max_pcone_viol <= 1e-7);
}

#[test]
fn test_socp_norm() {
    // min t  s.t.  (t, x1, x2) ∈ Q³,  x1 = x2 = 1
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(3).unwrap();
    task.put_cj(0, 1.).unwrap();
    task.put_var_bound(0, BoundKey::Free, -INF, INF).unwrap();
    task.put_var_bound(1, BoundKey::Fixed, 1., 1.).unwrap();
    task.put_var_bound(2, BoundKey::Fixed, 1., 1.).unwrap();
    task.append_cone(ConeType::Quadratic, &[0, 1, 2]).unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    let obj = task.get_primal_obj(SolutionType::Interior).unwrap();
    assert!((obj - 2f64.sqrt()).abs() < 1e-6);

    // the cone dual lies in Q³ as well
    let snx = task.get_snx(SolutionType::Interior).unwrap();
    assert!(snx[0] + 1e-7 >= (snx[1] * snx[1] + snx[2] * snx[2]).sqrt());
}

#[test]
fn test_rotated_socp() {
    // min t  s.t.  2·t·u ≥ x²,  u = 1,  x = 2
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(3).unwrap();
    task.put_cj(0, 1.).unwrap();
    task.put_var_bound(0, BoundKey::Free, -INF, INF).unwrap();
    task.put_var_bound(1, BoundKey::Fixed, 1., 1.).unwrap();
    task.put_var_bound(2, BoundKey::Fixed, 2., 2.).unwrap();
    task.append_cone(ConeType::RotatedQuadratic, &[0, 1, 2]).unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    let obj = task.get_primal_obj(SolutionType::Interior).unwrap();
    assert!((obj - 2.).abs() < 1e-6);
}

#[test]
fn test_socp_infeasible() {
    // (t, x) ∈ Q² with t ≤ 1 and x ≥ 2
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(2).unwrap();
    task.put_var_bound(0, BoundKey::Upper, -INF, 1.).unwrap();
    task.put_var_bound(1, BoundKey::Lower, 2., INF).unwrap();
    task.append_cone(ConeType::Quadratic, &[0, 1]).unwrap();

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
}

#[test]
fn test_socp_rejected_by_simplex() {
    let env = Env::new();
    let mut task = basic_socp_task(&env);
    task.put_param("optimizer", "primal_simplex").unwrap();
    assert!(task.optimize().is_err());
}
