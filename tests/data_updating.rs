use conicopt::*;

const INF: f64 = f64::INFINITY;

// min ½xᵀQx + cᵀx  s.t.  -1 ≤ x ≤ 1 as two rows
fn updating_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[10000.; 2],
        0.,
        &[vec![1., 0.], vec![0., 1.]],
        &[BoundKey::Range; 2],
        &[-1.; 2],
        &[1.; 2],
        &[BoundKey::Free; 2],
        &[-INF; 2],
        &[INF; 2],
    )
    .unwrap();
    // huge values exercise the scaling of the interior point method
    task.put_q_obj(&[0, 1, 1], &[0, 0, 1], &[40000., 1., 20000.])
        .unwrap();
    task
}

fn solved_x(task: &mut Task) -> Vec<f64> {
    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Interior).unwrap(), SolutionStatus::Optimal);
    task.get_xx(SolutionType::Interior).unwrap().to_vec()
}

fn close(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(a, b)| (a - b).abs() <= 1e-6)
}

#[test]
fn test_update_c() {
    let env = Env::new();
    let mut task1 = updating_task(&env);
    solved_x(&mut task1);
    assert!(task1.solution_defined(SolutionType::Interior));

    task1.put_c_slice(0, 2, &[0., 0.]).unwrap();
    assert!(!task1.solution_defined(SolutionType::Interior));
    assert_eq!(task1.termination_code(), None);
    let x1 = solved_x(&mut task1);

    let mut task2 = updating_task(&env);
    task2.put_c_slice(0, 2, &[0., 0.]).unwrap();
    let x2 = solved_x(&mut task2);
    assert!(close(&x1, &x2));
    assert!(close(&x1, &[0., 0.]));
}

#[test]
fn test_update_q() {
    let env = Env::new();
    let mut task1 = updating_task(&env);
    solved_x(&mut task1);

    // a new Q replaces the old one
    task1.put_q_obj(&[0, 1], &[0, 1], &[40000., 20000.]).unwrap();
    let x1 = solved_x(&mut task1);
    let (subi, subj, _) = task1.get_q_obj();
    assert_eq!(subi.len(), 2);
    assert!(subi.iter().zip(&subj).all(|(i, j)| i == j));

    // unconstrained minimizers -c/q_jj lie inside the box
    assert!(close(&x1, &[-0.25, -0.5]));
}

#[test]
fn test_update_a() {
    let env = Env::new();
    let mut task1 = updating_task(&env);
    let x0 = solved_x(&mut task1);

    task1.put_aij(0, 0, 2.).unwrap();
    assert_eq!(task1.get_aij(0, 0).unwrap(), 2.);
    let (cols, vals) = task1.get_arow(0).unwrap();
    assert_eq!((cols, vals), (vec![0], vec![2.]));
    // the minimizer stays inside the narrower box
    let x1 = solved_x(&mut task1);
    assert!(close(&x1, &x0));

    // explicit zeros remove entries
    task1.put_aij(0, 0, 0.).unwrap();
    assert_eq!(task1.get_num_a_nz(), 1);
}

#[test]
fn test_update_bounds() {
    let env = Env::new();
    let mut task = updating_task(&env);
    solved_x(&mut task);

    task.put_con_bound(0, BoundKey::Range, 0.5, 1.).unwrap();
    let x = solved_x(&mut task);
    assert!((x[0] - 0.5).abs() <= 1e-6);

    // bounds must be consistent with their key
    assert!(matches!(
        task.put_con_bound(0, BoundKey::Range, 2., 1.),
        Err(DataError::BoundOrder { .. })
    ));
    assert!(matches!(
        task.put_con_bound(0, BoundKey::Fixed, 0., 1.),
        Err(DataError::FixedMismatch { .. })
    ));
    // a failed update changes nothing
    assert_eq!(task.get_con_bound(0).unwrap(), (BoundKey::Range, 0.5, 1.));
}

#[test]
fn test_update_sense() {
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.append_vars(1).unwrap();
    task.put_var_bound(0, BoundKey::Range, -2., 3.).unwrap();
    task.put_cj(0, 1.).unwrap();

    task.optimize().unwrap();
    assert_eq!(task.get_xx(SolutionType::Basic).unwrap(), &[-2.]);

    task.put_obj_sense(ObjSense::Maximize);
    assert_eq!(task.get_obj_sense(), ObjSense::Maximize);
    assert!(!task.solution_defined(SolutionType::Basic));
    task.optimize().unwrap();
    assert_eq!(task.get_xx(SolutionType::Basic).unwrap(), &[3.]);
}
