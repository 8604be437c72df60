use conicopt::*;

const INF: f64 = f64::INFINITY;

fn lp_task(env: &Env) -> Task<'_> {
    // max 3x0 + 2x1 + 4x2 over a small production plan
    let mut task = Task::new(env);
    task.put_param("log_level", "1").unwrap();
    task.input_data_dense(
        &[3., 2., 4.],
        0.,
        &[vec![1., 1., 2.], vec![2., 0., 1.], vec![2., 2., 1.]],
        &[BoundKey::Upper; 3],
        &[-INF; 3],
        &[4., 5., 7.],
        &[BoundKey::Lower; 3],
        &[0.; 3],
        &[INF; 3],
    )
    .unwrap();
    task.put_obj_sense(ObjSense::Maximize);
    task
}

#[test]
fn test_concurrent_race() {
    let env = Env::new().with_num_threads(2);
    let mut task = lp_task(&env);
    task.print_to_buffer();

    let result = optimize_concurrent(
        &mut task,
        &[OptimizerType::PrimalSimplex, OptimizerType::Intpnt],
    );
    assert_eq!(result.tasks.len(), 2);
    assert_eq!(result.codes.len(), 2);
    let winner = result.winner.unwrap();
    assert!(result.codes[winner].is_ok());

    // the winner's results are now those of the task
    let whichsol = if task.solution_defined(SolutionType::Interior) {
        SolutionType::Interior
    } else {
        SolutionType::Basic
    };
    assert_eq!(task.get_sol_sta(whichsol).unwrap(), SolutionStatus::Optimal);
    assert!((task.get_primal_obj(whichsol).unwrap() - 31. / 3.).abs() < 1e-6);
    assert_eq!(task.termination_code(), Some(TerminationCode::Ok));
    assert!(task.get_print_buffer().unwrap().contains("conicopt"));

    // the losers were cancelled or finished as well
    for code in &result.codes {
        assert!(matches!(
            code,
            Ok(TerminationCode::Ok) | Ok(TerminationCode::UserCallback)
        ));
    }
}

#[test]
fn test_concurrent_infeasible() {
    let env = Env::new();
    let mut task = lp_task(&env);
    task.put_param("log_level", "0").unwrap();
    task.put_con_bound(0, BoundKey::Range, 20., 30.).unwrap();
    task.put_con_bound(1, BoundKey::Range, 0., 1.).unwrap();
    task.put_con_bound(2, BoundKey::Range, 0., 1.).unwrap();

    let result = optimize_concurrent(&mut task, &[OptimizerType::PrimalSimplex, OptimizerType::Conic]);
    assert!(result.winner.is_some());
    let certified = [SolutionType::Basic, SolutionType::Interior]
        .into_iter()
        .filter_map(|s| task.get_sol_sta(s).ok())
        .any(|s| s == SolutionStatus::PrimalInfeasibleCertificate);
    assert!(certified);
}

fn mip_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    // max 5x0 + 4x1 + 3x2  s.t.  2x0 + 3x1 + x2 ≤ 5,  4x0 + x1 + 2x2 ≤ 11,
    //                            3x0 + 4x1 + 2x2 ≤ 8,  x ≥ 0 integer
    task.input_data_dense(
        &[5., 4., 3.],
        0.,
        &[vec![2., 3., 1.], vec![4., 1., 2.], vec![3., 4., 2.]],
        &[BoundKey::Upper; 3],
        &[-INF; 3],
        &[5., 11., 8.],
        &[BoundKey::Lower; 3],
        &[0.; 3],
        &[INF; 3],
    )
    .unwrap();
    task.put_obj_sense(ObjSense::Maximize);
    task.put_var_type_list(&[0, 1, 2], &[VariableType::Integer; 3]).unwrap();
    task
}

#[test]
fn test_concurrent_mio_seeds() {
    let env = Env::new();
    let mut task = mip_task(&env);

    let result = optimize_concurrent_mio(&mut task, &[0, 1, 2]);
    assert_eq!(result.tasks.len(), 3);
    assert!(result.winner.is_some());
    assert_eq!(
        task.get_sol_sta(SolutionType::Integer).unwrap(),
        SolutionStatus::IntegerOptimal
    );
    assert!((task.get_primal_obj(SolutionType::Integer).unwrap() - 13.).abs() < 1e-9);
}

#[test]
fn test_concurrent_keeps_callback() {
    use std::sync::{Arc, Mutex};

    let env = Env::new();
    let mut task = lp_task(&env);
    task.put_param("log_level", "0").unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    task.set_progress_callback(move |p: &Progress| {
        log.lock().unwrap().push(p.code);
        0
    });

    // the copies report to their own callbacks only
    optimize_concurrent(&mut task, &[OptimizerType::Free]);
    assert_eq!(
        *events.lock().unwrap(),
        vec![CallbackCode::BeginConcurrent, CallbackCode::EndConcurrent]
    );

    // the callback of the task is still installed
    events.lock().unwrap().clear();
    task.optimize().unwrap();
    assert!(events.lock().unwrap().contains(&CallbackCode::BeginOptimizer));
}

#[test]
fn test_concurrent_mio_notifies_race() {
    use std::sync::{Arc, Mutex};

    let env = Env::new();
    let mut task = mip_task(&env);
    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    task.set_progress_callback(move |p: &Progress| {
        log.lock().unwrap().push(p.code);
        0
    });

    optimize_concurrent_mio(&mut task, &[0, 1]);
    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&CallbackCode::BeginConcurrent));
    assert_eq!(events.last(), Some(&CallbackCode::EndConcurrent));
    assert_eq!(events.len(), 2);
}
