use conicopt::*;

const INF: f64 = f64::INFINITY;

fn free_task<'a>(env: &'a Env, qdiag: &[f64], c: &[f64]) -> Task<'a> {
    let n = c.len();
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(n).unwrap();
    task.put_var_bound_slice(0, n, &vec![BoundKey::Free; n], &vec![-INF; n], &vec![INF; n])
        .unwrap();
    task.put_c_slice(0, n, c).unwrap();
    let diag: Vec<usize> = (0..n).filter(|&j| qdiag[j] != 0.).collect();
    let vals: Vec<f64> = diag.iter().map(|&j| qdiag[j]).collect();
    task.put_q_obj(&diag, &diag, &vals).unwrap();
    task
}

#[test]
fn test_unconstrained_feasible() {
    let env = Env::new();
    let c = [1., 2., -3.];
    let mut task = free_task(&env, &[1.; 3], &c);

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    let x = task.get_xx(SolutionType::Interior).unwrap();
    for (x, c) in x.iter().zip(c) {
        assert!((x + c).abs() <= 1e-6);
    }
}

#[test]
fn test_unconstrained_two_variables() {
    // min ½(x0² + x1²) + x0 - x1  →  -1 at (-1, 1)
    let env = Env::new();
    let mut task = free_task(&env, &[1.; 2], &[1., -1.]);

    task.optimize().unwrap();
    assert!((task.get_primal_obj(SolutionType::Interior).unwrap() + 1.).abs() <= 1e-6);
    assert!((task.get_dual_obj(SolutionType::Interior).unwrap() + 1.).abs() <= 1e-6);
}

#[test]
fn test_unconstrained_dual_infeasible() {
    let env = Env::new();
    let mut task = free_task(&env, &[0.; 3], &[1., 0., 0.]);

    // linear, so the simplex answers
    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Basic).unwrap(),
        SolutionStatus::DualInfeasibleCertificate
    );
    let r = task.get_xx(SolutionType::Basic).unwrap();
    assert!(r[0] < 0.);

    task.put_param("optimizer", "intpnt").unwrap();
    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::DualInfeasibleCertificate
    );
}
