use conicopt::*;

#[test]
fn test_param_names_and_values() {
    let env = Env::new();
    let mut task = Task::new(&env);

    task.put_param("CONICOPT_IPAR_OPTIMIZER", "intpnt").unwrap();
    assert_eq!(task.parameters().optimizer, OptimizerType::Intpnt);
    assert_eq!(task.get_int_param("optimizer").unwrap(), 1);

    task.put_param("presolve", "off").unwrap();
    assert!(!task.parameters().presolve);
    task.put_param("Presolve", "true").unwrap();
    assert!(task.parameters().presolve);

    task.put_param("conicopt_dpar_intpnt_tol_rel_gap", "1e-10").unwrap();
    assert_eq!(task.get_double_param("intpnt_tol_rel_gap").unwrap(), 1e-10);

    task.put_param("task_name", "knapsack").unwrap();
    assert_eq!(task.get_string_param("conicopt_spar_task_name").unwrap(), "knapsack");

    task.put_int_param("mio_max_nodes", 12).unwrap();
    task.put_double_param("mio_max_time", 3.5).unwrap();
    assert_eq!(task.parameters().mio_max_nodes, 12);
    assert_eq!(task.parameters().mio_max_time, 3.5);
}

#[test]
fn test_param_errors_leave_settings() {
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("simplex_max_iterations", "10").unwrap();

    assert!(matches!(
        task.put_param("simplex_max_iterations", "ten"),
        Err(ParameterError::InvalidValue { .. })
    ));
    assert!(matches!(
        task.put_param("simplex_max_iterations", "-3"),
        Err(ParameterError::InvalidValue { .. })
    ));
    assert_eq!(task.get_int_param("simplex_max_iterations").unwrap(), 10);

    assert!(matches!(
        task.put_param("no_such_parameter", "1"),
        Err(ParameterError::UnknownName(_))
    ));
    assert!(matches!(
        task.put_double_param("presolve", 1.),
        Err(ParameterError::WrongType(_))
    ));
    assert!(matches!(
        task.get_int_param("conicopt_dpar_presolve"),
        Err(ParameterError::WrongType(_))
    ));
    assert!(matches!(
        task.put_param("intpnt_tol_pfeas", "0"),
        Err(ParameterError::InvalidValue { .. })
    ));
    assert_eq!(task.get_double_param("intpnt_tol_pfeas").unwrap(), 1e-8);
}

#[test]
fn test_param_builder() {
    let env = Env::new();
    let mut task = Task::new(&env);
    let params = ParametersBuilder::default()
        .log_level(0)
        .optimizer(OptimizerType::PrimalSimplex)
        .mio_node_selection(NodeSelection::DepthFirst)
        .build()
        .unwrap();
    task.set_parameters(params).unwrap();
    assert_eq!(task.parameters().optimizer, OptimizerType::PrimalSimplex);
    assert_eq!(task.get_int_param("mio_node_selection").unwrap(), 1);

    assert!(ParametersBuilder::default().simplex_tol_primal(2.).build().is_err());
    let bad = Parameters {
        simplex_tol_primal: 2.,
        ..Parameters::default()
    };
    assert!(task.set_parameters(bad).is_err());
    assert_eq!(task.parameters().simplex_tol_primal, 1e-9);
}

#[test]
fn test_simplex_iteration_limit() {
    let env = Env::new();
    let mut task = Task::new(&env);
    task.input_data_dense(
        &[-1., -1., -1.],
        0.,
        &[vec![1., 2., 1.], vec![2., 1., 3.]],
        &[BoundKey::Upper; 2],
        &[f64::NEG_INFINITY; 2],
        &[4., 6.],
        &[BoundKey::Lower; 3],
        &[0.; 3],
        &[f64::INFINITY; 3],
    )
    .unwrap();
    task.put_param("log_level", "0").unwrap();
    task.put_param("presolve", "off").unwrap();
    task.put_param("simplex_max_iterations", "0").unwrap();

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::MaxIterations);
    assert_ne!(task.get_sol_sta(SolutionType::Basic).unwrap(), SolutionStatus::Optimal);
}
