#![allow(non_snake_case)]

//! Active set polishing of interior point solutions.
//!
//! At a degenerate optimum the interior point iterates approach bounds
//! whose duals also vanish, so those variables are only resolved to
//! about the square root of the gap tolerance.  Polishing guesses the
//! active bounds and rows from the interior solution, solves the
//! equality constrained problem on that set exactly and keeps the
//! result only if it is primal and dual feasible and no worse than the
//! interior point.

use super::problem::ProblemData;
use super::solution::Solution;
use crate::algebra::*;
use crate::lu::{LuSettings, SparseLU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Free,
    Lower,
    Upper,
}

// side of `l ≤ v ≤ u` taken as active given the slacks and duals
fn active_side(v: f64, l: f64, u: f64, dl: f64, du: f64) -> Active {
    let at_lower = l.is_finite() && v - l <= dl;
    let at_upper = u.is_finite() && u - v <= du;
    match (at_lower, at_upper) {
        (true, true) if u - v < v - l => Active::Upper,
        (true, _) => Active::Lower,
        (false, true) => Active::Upper,
        (false, false) if l == u => Active::Lower,
        _ => Active::Free,
    }
}

fn bound_of(side: Active, l: f64, u: f64) -> f64 {
    match side {
        Active::Upper => u,
        _ => l,
    }
}

/// Polish an optimal interior solution of a problem without cones.
/// Returns `None` if the guessed active set does not give an optimal
/// point within `tol_feas`.
pub(crate) fn polish_active_set(p: &ProblemData, sol: &Solution, tol_feas: f64) -> Option<Solution> {
    if !p.cones.is_empty() {
        return None;
    }
    let (m, n) = (p.numcon(), p.numvar());

    let vars: Vec<Active> = (0..n)
        .map(|j| active_side(sol.xx[j], p.lx[j], p.ux[j], sol.slx[j], sol.sux[j]))
        .collect();
    let rows: Vec<Active> = (0..m)
        .map(|i| active_side(sol.xc[i], p.lc[i], p.uc[i], sol.slc[i], sol.suc[i]))
        .collect();

    // x = x_F on the free variables, bounds elsewhere
    let mut x: Vec<f64> = (0..n)
        .map(|j| match vars[j] {
            Active::Free => 0.0,
            side => bound_of(side, p.lx[j], p.ux[j]),
        })
        .collect();

    // positions of the free variables and active rows in the KKT system
    let mut pos_var = vec![usize::MAX; n];
    let mut nF = 0;
    for j in (0..n).filter(|&j| vars[j] == Active::Free) {
        pos_var[j] = nF;
        nF += 1;
    }
    let mut pos_row = vec![usize::MAX; m];
    let mut dim = nF;
    for i in (0..m).filter(|&i| rows[i] != Active::Free) {
        pos_row[i] = dim;
        dim += 1;
    }
    if dim == 0 {
        return None;
    }

    //   [ Q_FF  A_RFᵀ ] [  x_F ]   [ -c_F - Q_FA x_A ]
    //   [ A_RF    0   ] [ -y_R ] = [  b_R - A_RA x_A ]
    let mut rhs = vec![0.0; dim];
    let (mut I, mut J, mut V) = (vec![], vec![], vec![]);
    for j in 0..n {
        if vars[j] == Active::Free {
            rhs[pos_var[j]] = -p.c[j];
        }
    }
    for i in 0..m {
        if rows[i] != Active::Free {
            rhs[pos_row[i]] = bound_of(rows[i], p.lc[i], p.uc[i]);
        }
    }
    if let Some(Q) = &p.Q {
        for col in 0..n {
            for k in Q.colptr[col]..Q.colptr[col + 1] {
                let (row, v) = (Q.rowval[k], Q.nzval[k]);
                if vars[row] != Active::Free {
                    continue;
                }
                if vars[col] == Active::Free {
                    I.push(pos_var[row]);
                    J.push(pos_var[col]);
                    V.push(v);
                } else {
                    rhs[pos_var[row]] -= v * x[col];
                }
            }
        }
    }
    for col in 0..n {
        for k in p.A.colptr[col]..p.A.colptr[col + 1] {
            let (row, v) = (p.A.rowval[k], p.A.nzval[k]);
            if rows[row] == Active::Free {
                continue;
            }
            if vars[col] == Active::Free {
                I.extend([pos_row[row], pos_var[col]]);
                J.extend([pos_var[col], pos_row[row]]);
                V.extend([v, v]);
            } else {
                rhs[pos_row[row]] -= v * x[col];
            }
        }
    }

    let K = CscMatrix::new_from_triplets(dim, dim, &I, &J, &V);
    let mut lu = match SparseLU::factor(&K, &LuSettings::default()) {
        Ok(lu) => lu,
        Err(e) => {
            log::debug!("polish: active set system not solvable ({})", e);
            return None;
        }
    };
    lu.solve(&mut rhs);
    if !rhs.iter().all(|v| v.is_finite()) {
        return None;
    }

    for j in (0..n).filter(|&j| vars[j] == Active::Free) {
        x[j] = rhs[pos_var[j]];
    }
    let mut y = vec![0.0; m];
    for i in (0..m).filter(|&i| rows[i] != Active::Free) {
        y[i] = -rhs[pos_row[i]];
    }

    let mut out = Solution::new(n, m);
    out.solsta = sol.solsta;
    out.prosta = sol.prosta;
    out.xc = p.activities(&x);

    // primal feasibility
    let scale = 1.0 + x.norm_inf().max(out.xc.norm_inf());
    let ptol = tol_feas * scale;
    let violated = |v: f64, l: f64, u: f64| v < l - ptol || v > u + ptol;
    if (0..n).any(|j| violated(x[j], p.lx[j], p.ux[j])) || (0..m).any(|i| violated(out.xc[i], p.lc[i], p.uc[i])) {
        log::debug!("polish: active set point is infeasible");
        return None;
    }

    // reduced costs c + Qx - Aᵀy carry the bound duals
    let mut r = p.q_times(&x);
    r.axpby(1.0, &p.c, 1.0);
    p.A.t().gemv(&mut r, &y, -1.0, 1.0);
    let dtol = tol_feas * (1.0 + r.norm_inf().max(y.norm_inf()));

    // dual multiplier `d` of a constraint on side `side` split into
    // lower and upper parts, or None with the wrong sign
    let split = |d: f64, side: Active, fixed: bool| -> Option<(f64, f64)> {
        match side {
            _ if fixed => Some((d.max(0.0), (-d).max(0.0))),
            Active::Lower if d >= -dtol => Some((d.max(0.0), 0.0)),
            Active::Upper if d <= dtol => Some((0.0, (-d).max(0.0))),
            Active::Free if d.abs() <= dtol => Some((0.0, 0.0)),
            _ => None,
        }
    };
    for j in 0..n {
        (out.slx[j], out.sux[j]) = split(r[j], vars[j], p.lx[j] == p.ux[j])?;
    }
    for i in 0..m {
        (out.slc[i], out.suc[i]) = split(y[i], rows[i], p.lc[i] == p.uc[i])?;
        out.y[i] = out.slc[i] - out.suc[i];
    }

    out.pobj = p.objective(&x);
    if out.pobj > sol.pobj + tol_feas * (1.0 + sol.pobj.abs()) {
        log::debug!("polish: objective {:e} worse than {:e}", out.pobj, sol.pobj);
        return None;
    }
    out.xx = x;
    out.dobj = p.dual_objective(&out);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::types::*;

    // min x0² + 0.1x1² + x2² - x0x2 - x1,  x0 + x1 + x2 ≥ 1,  x ≥ 0
    fn degenerate_qp() -> ProblemData {
        let Q = CscMatrix::from_dense_rows(&[
            vec![2., 0., -1.], //
            vec![0., 0.2, 0.], //
            vec![-1., 0., 2.], //
        ]);
        ProblemData {
            A: CscMatrix::from_dense_rows(&[vec![1., 1., 1.]]),
            c: vec![0., -1., 0.],
            cfix: 0.,
            Q: Some(Q),
            lc: vec![1.],
            uc: vec![f64::INFINITY],
            lx: vec![0.; 3],
            ux: vec![f64::INFINITY; 3],
            cones: vec![],
            integer: vec![false; 3],
        }
    }

    // an interior iterate typical of the end of a solve
    fn near_optimal(p: &ProblemData) -> Solution {
        let mut sol = Solution::new(3, 1);
        sol.solsta = SolutionStatus::Optimal;
        sol.prosta = ProblemStatus::PrimalAndDualFeasible;
        sol.xx = vec![6.1e-5, 5.0, 6.1e-5];
        sol.xc = p.activities(&sol.xx);
        sol.slc = vec![2e-9];
        sol.y = vec![2e-9];
        sol.slx = vec![1.6e-4, 2e-9, 1.6e-4];
        sol.pobj = p.objective(&sol.xx);
        sol
    }

    #[test]
    fn test_polish_degenerate_qp() {
        let p = degenerate_qp();
        let sol = near_optimal(&p);
        let polished = polish_active_set(&p, &sol, 1e-8).unwrap();

        assert_eq!(polished.xx[0], 0.);
        assert_eq!(polished.xx[2], 0.);
        assert!((polished.xx[1] - 5.).abs() < 1e-12);
        assert_eq!(polished.y, vec![0.]);
        assert!((polished.pobj + 2.5).abs() < 1e-12);
        assert!((polished.dobj + 2.5).abs() < 1e-12);
        assert_eq!(polished.solsta, SolutionStatus::Optimal);
    }

    #[test]
    fn test_polish_rejects_wrong_active_set() {
        // taking the row as active forces x1 = 1 with a row dual of the wrong sign
        let p = degenerate_qp();
        let mut sol = near_optimal(&p);
        sol.slc = vec![10.];
        assert!(polish_active_set(&p, &sol, 1e-8).is_none());

        // with every variable at a bound the active row alone is singular
        let mut sol = near_optimal(&p);
        sol.slx[1] = 10.;
        sol.xx[1] = 1e-9;
        sol.xc = p.activities(&sol.xx);
        sol.slc = vec![0.];
        assert!(polish_active_set(&p, &sol, 1e-8).is_none());
    }
}
