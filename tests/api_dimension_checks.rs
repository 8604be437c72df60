use conicopt::*;

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

const INF: f64 = f64::INFINITY;

fn api_dim_check_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.append_vars(4).unwrap();
    task.append_cons(6).unwrap();
    task
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks
    let env = Env::new();
    let mut task = api_dim_check_task(&env);
    task.put_param("log_level", "0").unwrap();
    assert_eq!(task.get_num_var(), 4);
    assert_eq!(task.get_num_con(), 6);
    task.put_c_slice(0, 4, &[0.; 4]).unwrap();
    task.put_acol(3, &[0, 5], &[1., 2.]).unwrap();
    assert_eq!(task.get_acol(3).unwrap(), (vec![0, 5], vec![1., 2.]));
    task.optimize().unwrap();
}

#[test]
fn api_dim_check_bad_indices() {
    let env = Env::new();
    let mut task = api_dim_check_task(&env);

    assert!(matches!(task.put_cj(4, 1.), Err(DataError::VariableIndex(4))));
    assert!(matches!(task.put_aij(6, 0, 1.), Err(DataError::ConstraintIndex(6))));
    assert!(matches!(task.put_aij(0, 4, 1.), Err(DataError::VariableIndex(4))));
    assert!(matches!(
        task.put_var_bound(7, BoundKey::Free, -INF, INF),
        Err(DataError::VariableIndex(7))
    ));
    assert!(matches!(
        task.put_con_bound(6, BoundKey::Free, -INF, INF),
        Err(DataError::ConstraintIndex(6))
    ));
    assert!(matches!(task.get_cone(0), Err(DataError::ConeIndex(0))));
    assert!(matches!(
        task.put_var_type(9, VariableType::Integer),
        Err(DataError::VariableIndex(9))
    ));
}

#[test]
fn api_dim_check_bad_lengths() {
    let env = Env::new();
    let mut task = api_dim_check_task(&env);

    assert!(matches!(
        task.put_c_slice(0, 4, &[0.; 3]),
        Err(DataError::LengthMismatch { expected: 4, found: 3 })
    ));
    assert!(matches!(
        task.put_acol(0, &[0, 1], &[1.]),
        Err(DataError::LengthMismatch { .. })
    ));
    assert!(matches!(
        task.put_var_bound_slice(0, 4, &[BoundKey::Free; 4], &[-INF; 3], &[INF; 4]),
        Err(DataError::LengthMismatch { .. })
    ));
    assert!(matches!(
        task.put_q_obj(&[0, 1], &[0], &[1., 1.]),
        Err(DataError::LengthMismatch { .. })
    ));
}

#[test]
fn api_dim_check_input_data() {
    let env = Env::new();
    let mut task = Task::new(&env);

    // A has a row of the wrong length
    assert!(task
        .input_data_dense(
            &[1., 1.],
            0.,
            &[vec![1., 1.], vec![1.]],
            &[BoundKey::Free; 2],
            &[-INF; 2],
            &[INF; 2],
            &[BoundKey::Free; 2],
            &[-INF; 2],
            &[INF; 2],
        )
        .is_err());

    // column pointers past the end of asub
    assert!(matches!(
        task.input_data(
            1,
            1,
            &[1.],
            0.,
            &[0],
            &[2],
            &[0],
            &[1.],
            &[BoundKey::Free],
            &[-INF],
            &[INF],
            &[BoundKey::Free],
            &[-INF],
            &[INF],
        ),
        Err(DataError::BadColumnPointers(0))
    ));

    // failed calls leave the task untouched
    assert_eq!(task.get_num_var(), 0);
    assert_eq!(task.get_num_con(), 0);
}

#[test]
fn api_dim_check_quadratic_upper_triangle() {
    let env = Env::new();
    let mut task = api_dim_check_task(&env);
    assert!(matches!(
        task.put_q_obj(&[0], &[1], &[1.]),
        Err(DataError::QuadraticUpperTriangle { i: 0, j: 1 })
    ));
    assert!(matches!(
        task.put_q_obj_ij(1, 2, 1.),
        Err(DataError::QuadraticUpperTriangle { .. })
    ));
}

#[test]
fn api_dim_check_non_finite() {
    let env = Env::new();
    let mut task = api_dim_check_task(&env);
    assert!(matches!(task.put_cj(0, f64::NAN), Err(DataError::NonFiniteValue { .. })));
    assert!(matches!(
        task.put_aij(0, 0, INF),
        Err(DataError::NonFiniteValue { .. })
    ));
    assert!(task.put_var_bound(0, BoundKey::Lower, INF, INF).is_err());
}
