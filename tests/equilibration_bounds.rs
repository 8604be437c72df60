use conicopt::*;

const INF: f64 = f64::INFINITY;

// max y0 + x1  s.t.  -1 ≤ y0 + x1 ≤ 1,  0 ≤ y0 ≤ 0.7,  0 ≤ x1 ≤ 0.7
// as a minimization in x0 = y0 / s with the first row scaled by `s`
fn badly_scaled_task(env: &Env, s: f64) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[-s, -1.],
        0.,
        &[vec![s * s, s], vec![s, 0.], vec![0., 1.]],
        &[BoundKey::Range, BoundKey::Range, BoundKey::Range],
        &[-s, 0., 0.],
        &[s, 0.7, 0.7],
        &[BoundKey::Free; 2],
        &[-INF; 2],
        &[INF; 2],
    )
    .unwrap();
    task
}

#[test]
fn test_badly_scaled_lp() {
    for s in [1e-4, 1., 1e4] {
        for scaling in ["on", "off"] {
            let env = Env::new();
            let mut task = badly_scaled_task(&env, s);
            task.put_param("simplex_scaling", scaling).unwrap();

            task.optimize().unwrap();
            assert_eq!(task.get_sol_sta(SolutionType::Basic).unwrap(), SolutionStatus::Optimal);
            let obj = task.get_primal_obj(SolutionType::Basic).unwrap();
            assert!((obj + 1.).abs() <= 1e-7, "scale {} scaling {}: {}", s, scaling, obj);
            let info = task.get_solution_info(SolutionType::Basic).unwrap();
            assert!(info.max_pcon_viol <= 1e-7 * s.max(1.) * s.max(1.));
        }
    }
}

#[test]
fn test_badly_scaled_intpnt() {
    let env = Env::new();
    let mut task = badly_scaled_task(&env, 1e3);
    task.put_param("optimizer", "intpnt").unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    let obj = task.get_primal_obj(SolutionType::Interior).unwrap();
    assert!((obj + 1.).abs() <= 1e-5);
}

#[test]
fn test_tiny_quadratic_term() {
    // a nearly singular Q is regularized rather than rejected
    let env = Env::new();
    let mut task = badly_scaled_task(&env, 1.);
    task.put_q_obj(&[0, 1], &[0, 1], &[1e-15, 2.]).unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
}

#[test]
fn test_iteration_limit() {
    let env = Env::new();
    let mut task = badly_scaled_task(&env, 1e6);
    task.put_param("optimizer", "intpnt").unwrap();
    task.put_param("intpnt_max_iterations", "2").unwrap();

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::MaxIterations);
    assert_ne!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::Optimal
    );
}
