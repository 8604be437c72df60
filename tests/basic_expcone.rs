use conicopt::*;

const INF: f64 = f64::INFINITY;

// max x  s.t.  z ≥ y·exp(x/y),  y = 1,  z = exp(5)
// with variables (x, y, z)
fn basic_expcone_task(env: &Env, z: f64) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(3).unwrap();
    task.put_cj(0, 1.).unwrap();
    task.put_var_bound(0, BoundKey::Free, -INF, INF).unwrap();
    task.put_var_bound(1, BoundKey::Fixed, 1., 1.).unwrap();
    task.put_var_bound(2, BoundKey::Fixed, z, z).unwrap();
    task.append_cone(ConeType::PrimalExp, &[2, 1, 0]).unwrap();
    task.put_obj_sense(ObjSense::Maximize);
    task
}

#[test]
fn test_expcone_feasible() {
    let env = Env::new();
    let mut task = basic_expcone_task(&env, f64::exp(5.));

    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);

    let x = task.get_xx(SolutionType::Interior).unwrap();
    let refsol = [5.0, 1.0, f64::exp(5.0)];
    for (x, r) in x.iter().zip(refsol) {
        assert!((x - r).abs() <= 1e-6 * r.abs().max(1.));
    }
    assert!((task.get_primal_obj(SolutionType::Interior).unwrap() - 5.).abs() <= 1e-6);
}

#[test]
fn test_expcone_euler() {
    // min t  s.t.  t ≥ exp(1)
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(3).unwrap();
    task.put_cj(0, 1.).unwrap();
    task.put_var_bound(0, BoundKey::Free, -INF, INF).unwrap();
    task.put_var_bound(1, BoundKey::Fixed, 1., 1.).unwrap();
    task.put_var_bound(2, BoundKey::Fixed, 1., 1.).unwrap();
    task.append_cone(ConeType::PrimalExp, &[0, 1, 2]).unwrap();

    task.optimize().unwrap();
    let obj = task.get_primal_obj(SolutionType::Interior).unwrap();
    assert!((obj - std::f64::consts::E).abs() < 1e-6);
}

#[test]
fn test_expcone_primal_infeasible() {
    // z = -1 leaves the cone empty
    let env = Env::new();
    let mut task = basic_expcone_task(&env, -1.);

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
}

#[test]
fn test_expcone_dual_infeasible() {
    // max x  s.t.  z ≥ y·exp(x/y) only
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(3).unwrap();
    task.put_cj(0, 1.).unwrap();
    task.put_var_bound_slice(0, 3, &[BoundKey::Free; 3], &[-INF; 3], &[INF; 3])
        .unwrap();
    task.append_cone(ConeType::PrimalExp, &[2, 1, 0]).unwrap();
    task.put_obj_sense(ObjSense::Maximize);

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::DualInfeasibleCertificate
    );
}
