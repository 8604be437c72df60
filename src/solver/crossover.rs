//! Basis identification from an interior point solution.
//!
//! Variables and logicals strictly inside their bounds are made basic,
//! the most interior first, and the remaining ones nonbasic at their
//! nearest bound.  The primal simplex then starts from that basis, so
//! only a few pivots are needed near an optimal interior point.

use super::callbacks::SolverCallbacks;
use super::simplex::*;
use crate::algebra::*;
use crate::lu::LuError;
use std::io::Write;

/// Guess a basis of `lp` from the primal point `x`
pub(crate) fn guess_basis(lp: &BoundedLp<f64>, x: &[f64], tol: f64) -> Vec<VarStatus> {
    let (m, n) = (lp.ncons(), lp.nvars());
    let mut r = vec![0.0; m];
    lp.A.gemv(&mut r, x, 1.0, 0.0);

    let values = x.iter().chain(r.iter());
    let lower = lp.lx.iter().chain(lp.lc.iter());
    let upper = lp.ux.iter().chain(lp.uc.iter());

    let mut status = Vec::with_capacity(n + m);
    // (interior distance, index) of the candidates for the basis
    let mut candidates = Vec::new();
    for (k, ((&v, &l), &u)) in values.zip(lower).zip(upper).enumerate() {
        let dl = (v - l) / (1.0 + l.abs().min(1e10));
        let du = (u - v) / (1.0 + u.abs().min(1e10));
        let dist = dl.min(du);
        let s = if l == u {
            VarStatus::Fixed
        } else if dist > tol {
            candidates.push((dist, k));
            VarStatus::Basic
        } else if dl <= du {
            VarStatus::AtLower
        } else {
            VarStatus::AtUpper
        };
        status.push(s);
    }

    // keep at most m basics, the most interior ones
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, k) in candidates.iter().skip(m) {
        let (l, u) = if k < n {
            (lp.lx[k], lp.ux[k])
        } else {
            (lp.lc[k - n], lp.uc[k - n])
        };
        let v = if k < n { x[k] } else { r[k - n] };
        status[k] = if l.is_finite() && (!u.is_finite() || v - l <= u - v) {
            VarStatus::AtLower
        } else if u.is_finite() {
            VarStatus::AtUpper
        } else {
            VarStatus::Free
        };
    }
    status
}

/// Run the primal simplex on `lp` from the basis guessed at `x`
pub(crate) fn crossover(
    lp: &BoundedLp<f64>,
    settings: &SimplexSettings<f64>,
    x: &[f64],
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
) -> Result<SimplexSolution<f64>, LuError> {
    let basis = guess_basis(lp, x, 1e-7);
    let nbasic = basis.iter().filter(|&&s| s == VarStatus::Basic).count();
    log::debug!(
        "crossover: {} of {} basics guessed from the interior point",
        nbasic,
        lp.ncons()
    );
    solve_lp(lp, settings, Some(&basis), out, callbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CscMatrix;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_guess_basis() {
        // x0 + x1 ≤ 4 with x = (1, 3): row tight, both variables interior
        let lp = BoundedLp {
            A: CscMatrix::from_dense_rows(&[vec![1.0, 1.0]]),
            c: vec![-1.0, -1.0],
            lc: vec![-INF],
            uc: vec![4.0],
            lx: vec![0.0, 0.0],
            ux: vec![INF, INF],
        };
        let basis = guess_basis(&lp, &[1.0, 3.0], 1e-7);
        // one basic only: the more interior variable x1
        assert_eq!(basis[2], VarStatus::AtUpper);
        assert_eq!(basis[1], VarStatus::Basic);
        assert_eq!(basis[0], VarStatus::AtLower);
    }

    #[test]
    fn test_crossover_reaches_optimum() {
        let lp = BoundedLp {
            A: CscMatrix::from_dense_rows(&[vec![1.0, 2.0], vec![3.0, 1.0]]),
            c: vec![-1.0, -1.0],
            lc: vec![-INF, -INF],
            uc: vec![4.0, 6.0],
            lx: vec![0.0, 0.0],
            ux: vec![INF, INF],
        };
        // near the optimal vertex (1.6, 1.2)
        let x = [1.6 - 1e-9, 1.2 - 1e-9];
        let settings = SimplexSettings::default();
        let mut callbacks = SolverCallbacks::none();
        let sol = crossover(&lp, &settings, &x, &mut std::io::sink(), &mut callbacks).unwrap();
        assert_eq!(sol.status, SimplexStatus::Optimal);
        assert!((sol.objective(&lp.c) + 2.8).abs() < 1e-9);
        assert!(sol.iterations <= 2);
    }
}
