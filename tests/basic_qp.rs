use conicopt::*;

const INF: f64 = f64::INFINITY;

// min x0² + 0.1x1² + x2² - x0x2 - x1  s.t.  x0 + x1 + x2 ≥ 1,  x ≥ 0
fn basic_qp_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[0., -1., 0.],
        0.,
        &[vec![1., 1., 1.]],
        &[BoundKey::Lower],
        &[1.],
        &[INF],
        &[BoundKey::Lower; 3],
        &[0.; 3],
        &[INF; 3],
    )
    .unwrap();
    task.put_q_obj(&[0, 1, 2, 2], &[0, 1, 2, 0], &[2., 0.2, 2., -1.])
        .unwrap();
    task
}

#[test]
fn test_qp_feasible() {
    let env = Env::new();
    let mut task = basic_qp_task(&env);

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::Ok);
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    // no basis for quadratic problems
    assert!(!task.solution_defined(SolutionType::Basic));

    let xx = task.get_xx(SolutionType::Interior).unwrap();
    // x0 and x2 sit at bounds with zero duals
    let refsol = [0., 5., 0.];
    for (x, r) in xx.iter().zip(refsol) {
        assert!((x - r).abs() < 1e-6);
    }
    let pobj = task.get_primal_obj(SolutionType::Interior).unwrap();
    let dobj = task.get_dual_obj(SolutionType::Interior).unwrap();
    assert!((pobj + 2.5).abs() < 1e-6);
    assert!((dobj + 2.5).abs() < 1e-6);

    // the row is inactive at the optimum
    let y = task.get_y(SolutionType::Interior).unwrap();
    assert!(y[0].abs() < 1e-6);
}

#[test]
fn test_qp_stationarity() {
    let env = Env::new();
    let mut task = basic_qp_task(&env);
    task.optimize().unwrap();

    let sol = SolutionType::Interior;
    let x = task.get_xx(sol).unwrap();
    let y = task.get_y(sol).unwrap();
    let slx = task.get_slx(sol).unwrap();
    let sux = task.get_sux(sol).unwrap();

    // Qx with Q given by its lower triangle
    let qx = [
        2. * x[0] - x[2],
        0.2 * x[1],
        -x[0] + 2. * x[2],
    ];
    let c = task.get_c();
    for j in 0..3 {
        let lhs = y[0] + slx[j] - sux[j];
        assert!((lhs - (c[j] + qx[j])).abs() < 1e-6);
    }
}

#[test]
fn test_qp_maximize_concave() {
    // max -(x0 - 1)² - (x1 - 2)²  =  -x0² - x1² + 2x0 + 4x1 - 5
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(2).unwrap();
    task.put_var_bound_slice(0, 2, &[BoundKey::Free; 2], &[-INF; 2], &[INF; 2])
        .unwrap();
    task.put_c_slice(0, 2, &[2., 4.]).unwrap();
    task.put_cfix(-5.).unwrap();
    task.put_q_obj(&[0, 1], &[0, 1], &[-2., -2.]).unwrap();
    task.put_obj_sense(ObjSense::Maximize);

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    let x = task.get_xx(SolutionType::Interior).unwrap();
    assert!((x[0] - 1.).abs() < 1e-6);
    assert!((x[1] - 2.).abs() < 1e-6);
    assert!(task.get_primal_obj(SolutionType::Interior).unwrap().abs() < 1e-6);
}

#[test]
fn test_qp_simplex_rejected() {
    let env = Env::new();
    let mut task = basic_qp_task(&env);
    task.put_param("optimizer", "primal_simplex").unwrap();
    assert!(matches!(
        task.optimize(),
        Err(OptimizeError::NoApplicableOptimizer(_))
    ));
}
