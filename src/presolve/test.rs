#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::task::ProblemStatus;

const INF: f64 = f64::INFINITY;

fn problem(rows: &[Vec<f64>], n: usize, c: &[f64]) -> ProblemData {
    let A = if rows.is_empty() {
        CscMatrix::zeros((0, n))
    } else {
        CscMatrix::from_dense_rows(rows)
    };
    let m = rows.len();
    ProblemData {
        A,
        c: c.to_vec(),
        cfix: 0.0,
        Q: None,
        lc: vec![-INF; m],
        uc: vec![INF; m],
        lx: vec![0.0; n],
        ux: vec![INF; n],
        cones: vec![],
        integer: vec![false; n],
    }
}

#[test]
fn test_fixed_and_singleton_postsolve() {
    // min x0 + x1  s.t.  x0 + x1 >= 2,  x1 = 0.5,  x0 >= 0
    let mut p = problem(&[vec![1.0, 1.0]], 2, &[1.0, 1.0]);
    p.lc[0] = 2.0;
    p.lx[1] = 0.5;
    p.ux[1] = 0.5;

    let (reduced, post) = match presolve(&p) {
        PresolveOutcome::Reduced(r, post) => (r, post),
        PresolveOutcome::Certified(_) => panic!("unexpected certificate"),
    };
    assert_eq!(reduced.numvar(), 0);
    assert_eq!(reduced.numcon(), 0);
    assert_eq!(post.removed_vars, 2);
    assert_eq!(post.removed_cons, 1);
    assert!((reduced.cfix - 2.0).abs() < 1e-12);

    let mut empty = Solution::new(0, 0);
    empty.solsta = SolutionStatus::Optimal;
    empty.prosta = ProblemStatus::PrimalAndDualFeasible;
    let sol = post.restore(&p, &empty);

    assert!((sol.xx[0] - 1.5).abs() < 1e-12);
    assert!((sol.xx[1] - 0.5).abs() < 1e-12);
    assert!((sol.y[0] - 1.0).abs() < 1e-12);
    assert_eq!(sol.slx[0], 0.0);
    assert!((sol.pobj - 2.0).abs() < 1e-12);
    assert!((sol.dobj - 2.0).abs() < 1e-12);
    assert_eq!(sol.skx, vec![StaKey::Basic, StaKey::Fixed]);
    assert_eq!(sol.skc, vec![StaKey::AtLower]);

    let info = p.solution_info(&sol);
    assert!(info.max_dual_viol < 1e-12);
}

#[test]
fn test_empty_row_infeasible() {
    // x0 = 1 and x0 >= 3
    let mut p = problem(&[vec![1.0]], 1, &[0.0]);
    p.lx[0] = 1.0;
    p.ux[0] = 1.0;
    p.lc[0] = 3.0;

    match presolve(&p) {
        PresolveOutcome::Certified(cert) => {
            assert_eq!(cert.solsta, SolutionStatus::PrimalInfeasibleCertificate);
            assert!(cert.dobj > 0.0);
            assert!((cert.dobj - 2.0).abs() < 1e-12);
        }
        PresolveOutcome::Reduced(..) => panic!("expected a certificate"),
    }
}

#[test]
fn test_singleton_row_conflict() {
    // 0 <= x0 <= 1 and 2 x0 >= 4
    let mut p = problem(&[vec![2.0]], 1, &[1.0]);
    p.ux[0] = 1.0;
    p.lc[0] = 4.0;

    match presolve(&p) {
        PresolveOutcome::Certified(cert) => {
            assert_eq!(cert.prosta, ProblemStatus::PrimalInfeasible);
            assert_eq!(cert.y, vec![1.0]);
            assert!((cert.dobj - 2.0).abs() < 1e-12);
        }
        PresolveOutcome::Reduced(..) => panic!("expected a certificate"),
    }
}

#[test]
fn test_empty_column_unbounded() {
    // min -x0 with x0 >= 0 and no rows
    let p = problem(&[], 1, &[-1.0]);

    match presolve(&p) {
        PresolveOutcome::Certified(cert) => {
            assert_eq!(cert.solsta, SolutionStatus::DualInfeasibleCertificate);
            assert_eq!(cert.xx, vec![1.0]);
            assert!(cert.pobj < 0.0);
        }
        PresolveOutcome::Reduced(..) => panic!("expected a ray"),
    }
}

#[test]
fn test_dense_rows_are_kept() {
    let mut p = problem(&[vec![1.0, 2.0], vec![3.0, 1.0]], 2, &[1.0, 1.0]);
    p.lc = vec![1.0, 1.0];

    match presolve(&p) {
        PresolveOutcome::Reduced(reduced, post) => {
            assert_eq!(reduced.numvar(), 2);
            assert_eq!(reduced.numcon(), 2);
            assert_eq!(post.removed_vars + post.removed_cons, 0);
            let status = post.reduce_statuses(&[1, 2, 3, 4], 2);
            assert_eq!(status, vec![1, 2, 3, 4]);
        }
        PresolveOutcome::Certified(_) => panic!("unexpected certificate"),
    }
}

#[test]
fn test_cone_members_are_renumbered() {
    // x0 is fixed and removed, the cone over (x1, x2) survives
    let mut p = problem(&[vec![1.0, 1.0, 1.0], vec![0.0, 1.0, 1.0]], 3, &[0.0, 1.0, 0.0]);
    p.lx[0] = 2.0;
    p.ux[0] = 2.0;
    p.lx[2] = -INF;
    p.lc = vec![3.0, -1.0];
    p.cones.push(Cone {
        ctype: crate::task::ConeType::Quadratic,
        members: vec![1, 2],
    });

    match presolve(&p) {
        PresolveOutcome::Reduced(reduced, _) => {
            assert_eq!(reduced.numvar(), 2);
            assert_eq!(reduced.cones[0].members, vec![0, 1]);
            assert_eq!(reduced.lc, vec![1.0, -1.0]);
        }
        PresolveOutcome::Certified(_) => panic!("unexpected certificate"),
    }
}
