use conicopt::*;
use std::sync::{Arc, Mutex};

const INF: f64 = f64::INFINITY;

// x0 + x1 ≤ 1 and x0 + x1 ≥ 3 cannot both hold
fn conflicting_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[1., 2.],
        0.,
        &[vec![1., 1.], vec![1., 1.]],
        &[BoundKey::Upper, BoundKey::Lower],
        &[-INF, 3.],
        &[1., INF],
        &[BoundKey::Lower; 2],
        &[0.; 2],
        &[INF; 2],
    )
    .unwrap();
    task
}

#[test]
fn test_repair_conflicting_rows() {
    let env = Env::new();
    let mut task = conflicting_task(&env);

    assert_eq!(task.optimize().unwrap(), TerminationCode::Ok);
    assert_eq!(
        task.get_pro_sta(SolutionType::Basic).unwrap(),
        ProblemStatus::PrimalInfeasible
    );

    let code = task.primal_repair(&[1.; 2], &[1.; 2], &[-1.; 2], &[-1.; 2]).unwrap();
    assert_eq!(code, TerminationCode::Ok);
    let penalty = task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj);
    assert!((penalty - 2.).abs() < 1e-8);

    // hard variable bounds hold at the repaired point
    let xx = task.get_xx(SolutionType::Basic).unwrap();
    assert!(xx.iter().all(|&v| v >= -1e-9));
    let s = xx[0] + xx[1];
    assert!((1. - 1e-9..=3. + 1e-9).contains(&s));

    let xc = task.get_xc(SolutionType::Basic).unwrap();
    assert!((xc[0] - s).abs() < 1e-9);
    assert!((xc[1] - s).abs() < 1e-9);
}

#[test]
fn test_repair_unequal_weights() {
    let env = Env::new();
    let mut task = conflicting_task(&env);

    // moving the upper row is cheap, so the lower row is met exactly
    task.primal_repair(&[10., 10.], &[1., 1.], &[-1.; 2], &[-1.; 2]).unwrap();
    let penalty = task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj);
    assert!((penalty - 2.).abs() < 1e-8);
    let xc = task.get_xc(SolutionType::Basic).unwrap();
    assert!((xc[1] - 3.).abs() < 1e-8);

    // and the other way round
    task.primal_repair(&[1., 1.], &[10., 10.], &[-1.; 2], &[-1.; 2]).unwrap();
    let penalty = task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj);
    assert!((penalty - 2.).abs() < 1e-8);
    let xc = task.get_xc(SolutionType::Basic).unwrap();
    assert!((xc[0] - 1.).abs() < 1e-8);
}

#[test]
fn test_repair_soft_variable_bounds() {
    // x0 ≥ 3 is hard, 0 ≤ x0 ≤ 1 is soft
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[1.],
        0.,
        &[vec![1.]],
        &[BoundKey::Lower],
        &[3.],
        &[INF],
        &[BoundKey::Range],
        &[0.],
        &[1.],
    )
    .unwrap();
    task.put_obj_sense(ObjSense::Maximize);

    task.primal_repair(&[-1.], &[-1.], &[1.], &[1.]).unwrap();
    let penalty = task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj);
    assert!((penalty - 2.).abs() < 1e-8);

    let xx = task.get_xx(SolutionType::Basic).unwrap();
    assert!((xx[0] - 3.).abs() < 1e-8);
    // the objective of the task at the repaired point
    assert!((task.get_primal_obj(SolutionType::Basic).unwrap() - 3.).abs() < 1e-8);
}

#[test]
fn test_repair_all_hard_is_infeasible() {
    let env = Env::new();
    let mut task = conflicting_task(&env);

    task.primal_repair(&[-1.; 2], &[-1.; 2], &[-1.; 2], &[-1.; 2]).unwrap();
    assert_ne!(
        task.get_sol_sta(SolutionType::Basic).ok(),
        Some(SolutionStatus::PrimalFeasible)
    );
}

#[test]
fn test_repair_callbacks() {
    let env = Env::new();
    let mut task = conflicting_task(&env);

    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    task.set_progress_callback(move |p: &Progress| {
        log.lock().unwrap().push(p.code);
        0
    });

    task.primal_repair(&[1.; 2], &[1.; 2], &[-1.; 2], &[-1.; 2]).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&CallbackCode::BeginPrimalRepair));
    assert_eq!(events.last(), Some(&CallbackCode::EndPrimalRepair));
    assert!(events.contains(&CallbackCode::BeginOptimizer));
    drop(events);

    // the callback is back on the task afterwards
    task.optimize().unwrap();
}

#[test]
fn test_repair_weight_lengths() {
    let env = Env::new();
    let mut task = conflicting_task(&env);
    let result = task.primal_repair(&[1.], &[1.; 2], &[1.; 2], &[1.; 2]);
    assert!(matches!(
        result,
        Err(OptimizeError::Data(DataError::LengthMismatch { .. }))
    ));
}
