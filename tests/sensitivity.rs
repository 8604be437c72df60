use conicopt::*;

const INF: f64 = f64::INFINITY;

// three supplies with capacities 400, 1200, 1000 and four demands of
// 800, 100, 500, 500 over seven shipping routes
//   x0: s0→d0   x1: s0→d1   x2: s0→d2   x3: s1→d1
//   x4: s1→d2   x5: s2→d0   x6: s2→d3
fn transport_task(env: &Env) -> Task<'_> {
    let mut task = Task::new(env);
    task.put_param("log_level", "0").unwrap();
    let asub = [[0, 3], [0, 4], [0, 5], [1, 4], [1, 5], [2, 3], [2, 6]];
    let mut ptrb = vec![];
    let mut ptre = vec![];
    let mut rows = vec![];
    for col in asub {
        ptrb.push(rows.len());
        rows.extend_from_slice(&col);
        ptre.push(rows.len());
    }
    let vals = vec![1.; rows.len()];
    task.input_data(
        7,
        7,
        &[1., 2., 5., 2., 1., 2., 1.],
        0.,
        &ptrb,
        &ptre,
        &rows,
        &vals,
        &[
            BoundKey::Upper,
            BoundKey::Upper,
            BoundKey::Upper,
            BoundKey::Fixed,
            BoundKey::Fixed,
            BoundKey::Fixed,
            BoundKey::Fixed,
        ],
        &[-INF, -INF, -INF, 800., 100., 500., 500.],
        &[400., 1200., 1000., 800., 100., 500., 500.],
        &[BoundKey::Lower; 7],
        &[0.; 7],
        &[INF; 7],
    )
    .unwrap();
    task
}

fn solved_obj(task: &mut Task) -> f64 {
    task.optimize().unwrap();
    assert_eq!(task.get_sol_sta(SolutionType::Basic).unwrap(), SolutionStatus::Optimal);
    task.get_primal_obj(SolutionType::Basic).unwrap()
}

#[test]
fn test_transport_solution() {
    let env = Env::new();
    let mut task = transport_task(&env);
    assert!((solved_obj(&mut task) - 2400.).abs() < 1e-7);
    let x = task.get_xx(SolutionType::Basic).unwrap();
    let refsol = [400., 0., 0., 100., 500., 400., 500.];
    for (x, r) in x.iter().zip(refsol) {
        assert!((x - r).abs() < 1e-7);
    }
}

#[test]
fn test_transport_bound_sensitivity() {
    let env = Env::new();
    let mut task = transport_task(&env);
    solved_obj(&mut task);

    let marks = [SensitivityMark::Upper, SensitivityMark::Upper, SensitivityMark::Upper, SensitivityMark::Upper];
    let (cons, vars) = task
        .primal_sensitivity(&[0, 1, 2, 3], &marks, &[2], &[SensitivityMark::Lower])
        .unwrap();

    // the first supply is exhausted: each unit saves one
    assert!((cons[0].left_price + 1.).abs() < 1e-9);
    assert_eq!(cons[0].left_price, cons[0].right_price);
    assert!((cons[0].left_range + 100.).abs() < 1e-7);
    assert!((cons[0].right_range - 400.).abs() < 1e-7);

    // spare capacity has no value up to the slack
    assert_eq!(cons[1].left_price, 0.);
    assert!((cons[1].left_range + 600.).abs() < 1e-7);
    assert_eq!(cons[1].right_range, INF);

    // the first demand is served from the dearer supply
    assert!((cons[3].left_price - 2.).abs() < 1e-9);
    assert!((cons[3].left_range + 400.).abs() < 1e-7);
    assert!((cons[3].right_range - 100.).abs() < 1e-7);

    // the unused route x2 is priced by its reduced cost; forcing it in
    // pushes x5 into the spare capacity of the last supply
    assert!((vars[0].left_price - 5.).abs() < 1e-9);
    assert!((vars[0].left_range + 400.).abs() < 1e-7);
    assert!((vars[0].right_range - 100.).abs() < 1e-7);
}

#[test]
fn test_transport_bound_perturbation() {
    let env = Env::new();
    let mut task = transport_task(&env);
    let base = solved_obj(&mut task);

    let cons: Vec<usize> = (0..7).collect();
    let marks: Vec<SensitivityMark> = (0..7)
        .map(|i| if i < 3 { SensitivityMark::Upper } else { SensitivityMark::Lower })
        .collect();
    let (sens, _) = task.primal_sensitivity(&cons, &marks, &[], &[]).unwrap();

    for i in 0..7 {
        let s = sens[i];
        assert!(s.left_range <= 0. && s.right_range >= 0.);
        for delta in [s.left_range.max(-50.) / 2., s.right_range.min(50.) / 2.] {
            if delta == 0. {
                continue;
            }
            let mut perturbed = transport_task(&env);
            let (key, l, u) = perturbed.get_con_bound(i).unwrap();
            let (l, u) = match key {
                BoundKey::Fixed => (l + delta, u + delta),
                _ => (l, u + delta),
            };
            perturbed.put_con_bound(i, key, l, u).unwrap();
            let obj = solved_obj(&mut perturbed);
            let price = if delta < 0. { s.left_price } else { s.right_price };
            assert!(
                (obj - (base + price * delta)).abs() < 1e-6,
                "row {}: {} vs {}",
                i,
                obj,
                base + price * delta
            );
        }
    }
}

#[test]
fn test_transport_cost_sensitivity() {
    let env = Env::new();
    let mut task = transport_task(&env);
    let base = solved_obj(&mut task);
    let x = task.get_xx(SolutionType::Basic).unwrap().to_vec();

    let vars: Vec<usize> = (0..7).collect();
    let sens = task.dual_sensitivity(&vars).unwrap();

    // nonbasic routes may only get dearer, down to their reduced cost
    assert!((sens[1].left_range + 1.).abs() < 1e-9);
    assert!((sens[2].left_range + 5.).abs() < 1e-9);
    assert_eq!(sens[2].right_range, INF);

    for j in 0..7 {
        let s = sens[j];
        assert_eq!(s.left_price, x[j]);
        for delta in [s.left_range.max(-1.) / 2., s.right_range.min(1.) / 2.] {
            if delta == 0. {
                continue;
            }
            let mut perturbed = transport_task(&env);
            perturbed.put_cj(j, perturbed.get_c()[j] + delta).unwrap();
            let obj = solved_obj(&mut perturbed);
            assert!((obj - (base + x[j] * delta)).abs() < 1e-6, "route {}", j);
        }
    }
}

#[test]
fn test_cost_sensitivity_maximize() {
    // max 3x0 + 2x1  s.t.  x0 + x1 ≤ 4,  x0 + 3x1 ≤ 7,  x0 ≤ 3
    let env = Env::new();
    let mut task = Task::new(&env);
    task.put_param("log_level", "0").unwrap();
    task.input_data_dense(
        &[3., 2.],
        0.,
        &[vec![1., 1.], vec![1., 3.]],
        &[BoundKey::Upper; 2],
        &[-INF; 2],
        &[4., 7.],
        &[BoundKey::Range, BoundKey::Lower],
        &[0., 0.],
        &[3., INF],
    )
    .unwrap();
    task.put_obj_sense(ObjSense::Maximize);
    let base = solved_obj(&mut task);
    assert!((base - 11.).abs() < 1e-9);

    // x = (3, 1) stays optimal while 2 ≤ c0 and 0 ≤ c1 ≤ 3
    let sens = task.dual_sensitivity(&[0, 1]).unwrap();
    assert!((sens[0].left_range + 1.).abs() < 1e-9);
    assert_eq!(sens[0].right_range, INF);
    assert!((sens[1].left_range + 2.).abs() < 1e-9);
    assert!((sens[1].right_range - 1.).abs() < 1e-9);
}

#[test]
fn test_solve_with_basis() {
    let env = Env::new();
    let mut task = transport_task(&env);
    solved_obj(&mut task);

    let m = task.get_num_con();
    let basis = task.init_basis_solve().unwrap();
    assert_eq!(basis.len(), m);

    // column p of B: eᵢ for a logical, aⱼ for a variable
    let column = |p: usize| -> Vec<f64> {
        let mut col = vec![0.; m];
        if basis[p] < m {
            col[basis[p]] = 1.;
        } else {
            let (rows, vals) = task.get_acol(basis[p] - m).unwrap();
            for (i, v) in rows.into_iter().zip(vals) {
                col[i] = v;
            }
        }
        col
    };
    let columns: Vec<Vec<f64>> = (0..m).map(column).collect();

    let b = [1., -2., 0., 3., 0.5, 0., 4.];
    let rhs = SparseVector::from_dense(&b);

    // B x = b
    let x = task.solve_with_basis(false, &rhs).unwrap().to_dense();
    for i in 0..m {
        let bx: f64 = (0..m).map(|p| columns[p][i] * x[p]).sum();
        assert!((bx - b[i]).abs() < 1e-9);
    }

    // Bᵀ x = b
    let x = task.solve_with_basis(true, &rhs).unwrap().to_dense();
    for p in 0..m {
        let btx: f64 = (0..m).map(|i| columns[p][i] * x[i]).sum();
        assert!((btx - b[p]).abs() < 1e-9);
    }

    // wrong length
    assert!(task.solve_with_basis(false, &SparseVector::from_dense(&[1.])).is_err());
}

#[test]
fn test_sensitivity_without_basis() {
    let env = Env::new();
    let mut task = transport_task(&env);
    assert!(matches!(task.init_basis_solve(), Err(OptimizeError::NoBasis)));
    assert!(matches!(
        task.solve_with_basis(false, &SparseVector::from_dense(&[0.; 7])),
        Err(OptimizeError::NoBasis)
    ));

    // the interior solution alone has no basis
    task.put_param("optimizer", "intpnt").unwrap();
    task.put_param("intpnt_basis", "off").unwrap();
    task.optimize().unwrap();
    assert!(matches!(task.dual_sensitivity(&[0]), Err(OptimizeError::NoBasis)));
}
