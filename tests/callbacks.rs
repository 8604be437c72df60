use conicopt::*;
use std::sync::{Arc, Mutex};

const INF: f64 = f64::INFINITY;

// min ‖x - (1, 2, 3)‖² over x0 + x1 + x2 ≤ 3
fn qp_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[-2., -4., -6.],
        14.,
        &[vec![1., 1., 1.]],
        &[BoundKey::Upper],
        &[-INF],
        &[3.],
        &[BoundKey::Free; 3],
        &[-INF; 3],
        &[INF; 3],
    )
    .unwrap();
    task.put_q_obj(&[0, 1, 2], &[0, 1, 2], &[2., 2., 2.]).unwrap();
    task
}

#[test]
fn test_callback_terminates_intpnt() {
    let env = Env::new();
    let mut task = qp_task(&env);

    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    task.set_progress_callback(move |p: &Progress| {
        if p.code == CallbackCode::IntpntIter {
            *counter.lock().unwrap() += 1;
            1
        } else {
            0
        }
    });

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::UserCallback);
    assert_eq!(task.termination_code(), Some(TerminationCode::UserCallback));
    assert_ne!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::Optimal
    );
    // stopped at the first iteration boundary
    assert_eq!(*calls.lock().unwrap(), 1);
    assert!(task.get_int_inf(IntInfItem::IntpntIter) <= 1);

    // without the callback the same task solves
    task.unset_progress_callback();
    assert_eq!(task.optimize().unwrap(), TerminationCode::Ok);
    let x = task.get_xx(SolutionType::Interior).unwrap();
    for (x, r) in x.iter().zip([0., 1., 2.]) {
        assert!((x - r).abs() < 1e-6);
    }
}

#[test]
fn test_callback_terminates_simplex() {
    // a transportation LP needs several pivots
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.put_param("presolve", "off").unwrap();
    task.input_data_dense(
        &[4., 6., 9., 5., 3., 8.],
        0.,
        &[
            vec![1., 1., 1., 0., 0., 0.],
            vec![0., 0., 0., 1., 1., 1.],
            vec![1., 0., 0., 1., 0., 0.],
            vec![0., 1., 0., 0., 1., 0.],
            vec![0., 0., 1., 0., 0., 1.],
        ],
        &[
            BoundKey::Upper,
            BoundKey::Upper,
            BoundKey::Fixed,
            BoundKey::Fixed,
            BoundKey::Fixed,
        ],
        &[-INF, -INF, 10., 20., 15.],
        &[30., 25., 10., 20., 15.],
        &[BoundKey::Lower; 6],
        &[0.; 6],
        &[INF; 6],
    )
    .unwrap();

    task.set_progress_callback(|p: &Progress| (p.code == CallbackCode::UpdatePrimalSimplex) as i32);
    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::UserCallback);
    assert_ne!(
        task.get_sol_sta(SolutionType::Basic).unwrap(),
        SolutionStatus::Optimal
    );
}

#[test]
fn test_callback_event_order() {
    let env = Env::new();
    let mut task = qp_task(&env);
    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    task.set_progress_callback(move |p: &Progress| {
        log.lock().unwrap().push(p.code);
        0
    });
    task.optimize().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&CallbackCode::BeginOptimizer));
    assert_eq!(events.last(), Some(&CallbackCode::EndOptimizer));
    let position = |code| events.iter().position(|&c| c == code).unwrap();
    assert!(position(CallbackCode::BeginIntpnt) < position(CallbackCode::IntpntIter));
    assert!(position(CallbackCode::IntpntIter) < position(CallbackCode::EndIntpnt));
}

#[test]
fn test_callback_telemetry() {
    let env = Env::new();
    let mut task = qp_task(&env);
    let last = Arc::new(Mutex::new(None));
    let keep = last.clone();
    task.set_progress_callback(move |p: &Progress| {
        if p.code == CallbackCode::IntpntIter {
            *keep.lock().unwrap() = Some(p.clone());
        }
        0
    });
    task.optimize().unwrap();

    let p = last.lock().unwrap().clone().unwrap();
    assert!(p.iterations >= 1);
    assert!(p.elapsed >= 0.);
    assert!(p.mu.is_finite());
    // the final iterate is reached after the last notification
    assert!((p.iterations as i64) < task.get_int_inf(IntInfItem::IntpntIter));
}
