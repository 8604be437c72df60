#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use conicopt::*;

    // min x² + x  s.t.  x ≥ 2, as a one-column problem with a cone-free Q
    let env = Env::new();
    let mut task = Task::new(&env);
    task.input_data_dense(
        &[1.0],
        0.0,
        &[vec![1.0]],
        &[BoundKey::Lower],
        &[2.0],
        &[f64::INFINITY],
        &[BoundKey::Free],
        &[f64::NEG_INFINITY],
        &[f64::INFINITY],
    )
    .unwrap();
    task.put_q_obj_ij(0, 0, 2.0).unwrap();
    task.put_param("log_level", "0").unwrap();
    task.optimize().unwrap();

    // write the problem to a file
    let file = tempfile::NamedTempFile::new().unwrap();
    task.write_json_file(file.path()).unwrap();

    // read the problem from the file
    let mut task2 = Task::read_json_file(&env, file.path()).unwrap();
    assert!(!task2.solution_defined(SolutionType::Interior));
    task2.optimize().unwrap();
    assert_eq!(
        task.get_xx(SolutionType::Interior).unwrap(),
        task2.get_xx(SolutionType::Interior).unwrap()
    );

    // parameters travel with the problem
    task.put_param("intpnt_max_iterations", "1").unwrap();
    task.put_param("optimizer_max_time", "1e30").unwrap();
    task.write_json_file(file.path()).unwrap();
    let mut task3 = Task::read_json_file(&env, file.path()).unwrap();
    assert_eq!(task3.get_double_param("optimizer_max_time").unwrap(), 1e30);
    assert_eq!(task3.optimize().unwrap(), TerminationCode::MaxIterations);
}

#[cfg(feature = "serde")]
#[test]
fn test_json_conic_and_integer_data() {
    use conicopt::*;

    let env = Env::new();
    let mut task = Task::new(&env);
    task.append_vars(3).unwrap();
    task.put_var_bound_slice(
        0,
        3,
        &[BoundKey::Free, BoundKey::Range, BoundKey::Fixed],
        &[f64::NEG_INFINITY, -1., 2.],
        &[f64::INFINITY, 1., 2.],
    )
    .unwrap();
    task.append_cone(ConeType::PrimalPower(0.25), &[2, 1, 0]).unwrap();
    task.put_var_type(1, VariableType::Integer).unwrap();
    task.put_xx_slice(SolutionType::Integer, 1, 2, &[1.]).unwrap();
    task.put_obj_sense(ObjSense::Maximize);

    let mut buffer = Vec::new();
    task.write_json(&mut buffer).unwrap();
    let task2 = Task::read_json(&env, &mut buffer.as_slice()).unwrap();

    assert_eq!(task2.get_obj_sense(), ObjSense::Maximize);
    assert_eq!(task2.get_cone(0).unwrap().ctype, ConeType::PrimalPower(0.25));
    assert_eq!(task2.get_var_type(1).unwrap(), VariableType::Integer);
    assert_eq!(task2.get_var_bound(2).unwrap(), (BoundKey::Fixed, 2., 2.));
}
