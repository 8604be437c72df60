use conicopt::*;

const INF: f64 = f64::INFINITY;

// min ½‖x‖²  s.t.  b - x ∈ S³₊
// with s = b - x carried by six extra variables in scaled triangle form
fn basic_sdp_task(env: &Env) -> Task<'_> {
    let b = [-3., 1., 4., 1., 2., 5.];
    let rows: Vec<Vec<f64>> = (0..6)
        .map(|i| {
            let mut row = vec![0.; 12];
            row[i] = 1.;
            row[i + 6] = 1.;
            row
        })
        .collect();

    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[0.; 12],
        0.,
        &rows,
        &[BoundKey::Fixed; 6],
        &b,
        &b,
        &[BoundKey::Free; 12],
        &[-INF; 12],
        &[INF; 12],
    )
    .unwrap();
    let diag: Vec<usize> = (0..6).collect();
    task.put_q_obj(&diag, &diag, &[1.; 6]).unwrap();
    task.append_cone(ConeType::PsdTriangle(3), &(6..12).collect::<Vec<_>>())
        .unwrap();
    task
}

#[test]
fn test_sdp_feasible() {
    let env = Env::new();
    let mut task = basic_sdp_task(&env);

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);

    let refsol = [
        -3.0729833267361095,
        0.3696004167288786,
        -0.022226685581313674,
        0.31441213129613066,
        -0.026739700851545107,
        -0.016084530571308823,
    ];
    let x = task.get_xx(SolutionType::Interior).unwrap();
    for (x, r) in x.iter().zip(refsol) {
        assert!((x - r).abs() <= 1e-6);
    }
    let refobj = 4.840076866013861;
    assert!((task.get_primal_obj(SolutionType::Interior).unwrap() - refobj).abs() <= 1e-6);
}

#[test]
fn test_sdp_off_diagonal_fixed() {
    // min X00 + X11  s.t.  X01 = 1,  X ⪰ 0
    // members (X00, √2·X01, X11)
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[1., 0., 1.],
        0.,
        &[vec![0., 1., 0.]],
        &[BoundKey::Fixed],
        &[2f64.sqrt()],
        &[2f64.sqrt()],
        &[BoundKey::Free; 3],
        &[-INF; 3],
        &[INF; 3],
    )
    .unwrap();
    task.append_cone(ConeType::PsdTriangle(2), &[0, 1, 2]).unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    assert!((task.get_primal_obj(SolutionType::Interior).unwrap() - 2.).abs() < 1e-6);
    let x = task.get_xx(SolutionType::Interior).unwrap();
    assert!((x[0] - 1.).abs() < 1e-5);
    assert!((x[2] - 1.).abs() < 1e-5);
}

#[test]
fn test_sdp_primal_infeasible() {
    // 0 ⪯ x ⪯ b with trace(x) ≥ 100
    let env = Env::new();
    let mut task = basic_sdp_task(&env);
    let first = task.get_num_var();
    task.append_vars(6).unwrap();
    task.put_var_bound_slice(first, first + 6, &[BoundKey::Free; 6], &[-INF; 6], &[INF; 6])
        .unwrap();
    let rows = task.get_num_con();
    task.append_cons(6).unwrap();
    for i in 0..6 {
        // x - t = 0 with t ⪰ 0
        task.put_arow(rows + i, &[i, first + i], &[1., -1.]).unwrap();
        task.put_con_bound(rows + i, BoundKey::Fixed, 0., 0.).unwrap();
    }
    task.append_cone(ConeType::PsdTriangle(3), &(first..first + 6).collect::<Vec<_>>())
        .unwrap();
    let cons = task.get_num_con();
    task.append_cons(1).unwrap();
    task.put_arow(cons, &[0, 2, 5], &[1., 1., 1.]).unwrap();
    task.put_con_bound(cons, BoundKey::Lower, 100., INF).unwrap();

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
}

#[test]
fn test_sdp_with_integers_rejected() {
    let env = Env::new();
    let mut task = basic_sdp_task(&env);
    task.put_var_type(0, VariableType::Integer).unwrap();
    assert!(matches!(
        task.optimize(),
        Err(OptimizeError::NoApplicableOptimizer(_))
    ));
}
