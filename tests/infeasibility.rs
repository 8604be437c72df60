use conicopt::*;

const INF: f64 = f64::INFINITY;

// x0 + x1 = 1,  x0 + x1 = 2,  x ≥ 0
fn infeasible_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[1., 1.],
        0.,
        &[vec![1., 1.], vec![1., 1.]],
        &[BoundKey::Fixed; 2],
        &[1., 2.],
        &[1., 2.],
        &[BoundKey::Lower; 2],
        &[0.; 2],
        &[INF; 2],
    )
    .unwrap();
    task
}

// Aᵀy + slx - sux = 0 and lcᵀslc - ucᵀsuc + lxᵀslx - uxᵀsux > 0
fn check_farkas(task: &Task, whichsol: SolutionType) {
    let slc = task.get_slc(whichsol).unwrap();
    let suc = task.get_suc(whichsol).unwrap();
    let slx = task.get_slx(whichsol).unwrap();
    let sux = task.get_sux(whichsol).unwrap();
    let y = task.get_y(whichsol).unwrap();

    let mut scale = 0.0_f64;
    for j in 0..task.get_num_var() {
        let (rows, vals) = task.get_acol(j).unwrap();
        let aty: f64 = rows.iter().zip(&vals).map(|(&i, &v)| v * y[i]).sum();
        let r = aty + slx[j] - sux[j];
        scale = scale.max(slx[j].abs()).max(sux[j].abs());
        assert!(r.abs() < 1e-6, "column {} residual {}", j, r);
    }

    let term = |l: f64, u: f64, sl: f64, su: f64| {
        assert!(sl >= -1e-9 && su >= -1e-9);
        let mut t = 0.0;
        if l.is_finite() {
            t += l * sl;
        }
        if u.is_finite() {
            t -= u * su;
        }
        t
    };
    let mut value = 0.0;
    for i in 0..task.get_num_con() {
        let (_, l, u) = task.get_con_bound(i).unwrap();
        scale = scale.max(slc[i].abs()).max(suc[i].abs());
        value += term(l, u, slc[i], suc[i]);
    }
    for j in 0..task.get_num_var() {
        let (_, l, u) = task.get_var_bound(j).unwrap();
        value += term(l, u, slx[j], sux[j]);
    }
    assert!(scale > 0.);
    assert!(value > 1e-6 * scale, "Farkas value {}", value);
}

#[test]
fn test_primal_infeasible_simplex() {
    let env = Env::new();
    let mut task = infeasible_task(&env);
    task.put_param("optimizer", "primal_simplex").unwrap();

    let code = task.optimize().unwrap();
    assert_eq!(code, TerminationCode::Ok);
    assert_eq!(
        task.get_sol_sta(SolutionType::Basic).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
    assert_eq!(
        task.get_pro_sta(SolutionType::Basic).unwrap(),
        ProblemStatus::PrimalInfeasible
    );
    check_farkas(&task, SolutionType::Basic);
}

#[test]
fn test_primal_infeasible_intpnt() {
    let env = Env::new();
    let mut task = infeasible_task(&env);
    task.put_param("optimizer", "intpnt").unwrap();

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
    check_farkas(&task, SolutionType::Interior);
}

#[test]
fn test_primal_infeasible_without_presolve() {
    let env = Env::new();
    let mut task = infeasible_task(&env);
    task.put_param("presolve", "off").unwrap();
    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Basic).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
    check_farkas(&task, SolutionType::Basic);
}

#[test]
fn test_infeasible_bounds_maximize() {
    // the certificate does not depend on the objective sense
    let env = Env::new();
    let mut task = infeasible_task(&env);
    task.put_obj_sense(ObjSense::Maximize);
    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Basic).unwrap(),
        SolutionStatus::PrimalInfeasibleCertificate
    );
    check_farkas(&task, SolutionType::Basic);
}

#[test]
fn test_dual_infeasible_qp() {
    // min x0² - x1  s.t.  x0 + x1 ≥ 0,  x1 free
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[0., -1.],
        0.,
        &[vec![1., 1.]],
        &[BoundKey::Lower],
        &[0.],
        &[INF],
        &[BoundKey::Free; 2],
        &[-INF; 2],
        &[INF; 2],
    )
    .unwrap();
    task.put_q_obj_ij(0, 0, 2.).unwrap();

    task.optimize().unwrap();
    assert_eq!(
        task.get_sol_sta(SolutionType::Interior).unwrap(),
        SolutionStatus::DualInfeasibleCertificate
    );
    let r = task.get_xx(SolutionType::Interior).unwrap();
    // Qr = 0, cᵀr < 0 and the row stays feasible along r
    assert!(r[0].abs() < 1e-6 * r[1].abs().max(1.));
    assert!(-r[1] < 0.);
    assert!(r[0] + r[1] >= -1e-6);
}
