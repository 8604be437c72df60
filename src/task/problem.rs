#![allow(non_snake_case)]

use super::solution::Solution;
use super::types::*;
use crate::algebra::*;
use crate::solver::simplex::BoundedLp;

/// A problem as handed to the engines: always a minimization, with
/// infinite bounds given as `±∞` and `Q` stored as a full symmetric
/// matrix.  Objective `½xᵀQx + cᵀx + cfix`.
#[derive(Debug, Clone)]
pub(crate) struct ProblemData {
    pub A: CscMatrix<f64>,
    pub c: Vec<f64>,
    pub cfix: f64,
    pub Q: Option<CscMatrix<f64>>,
    pub lc: Vec<f64>,
    pub uc: Vec<f64>,
    pub lx: Vec<f64>,
    pub ux: Vec<f64>,
    pub cones: Vec<Cone>,
    pub integer: Vec<bool>,
}

impl ProblemData {
    pub fn numvar(&self) -> usize {
        self.A.n
    }

    pub fn numcon(&self) -> usize {
        self.A.m
    }

    pub fn has_integers(&self) -> bool {
        self.integer.iter().any(|&b| b)
    }

    /// true if the problem is a pure LP relaxation
    pub fn is_linear(&self) -> bool {
        self.cones.is_empty() && self.Q.as_ref().map_or(true, |Q| Q.nnz() == 0)
    }

    pub fn has_psd(&self) -> bool {
        self.cones
            .iter()
            .any(|k| matches!(k.ctype, ConeType::PsdTriangle(_)))
    }

    /// The linear part in the form taken by the simplex
    pub fn lp(&self) -> BoundedLp<f64> {
        BoundedLp {
            A: self.A.clone(),
            c: self.c.clone(),
            lc: self.lc.clone(),
            uc: self.uc.clone(),
            lx: self.lx.clone(),
            ux: self.ux.clone(),
        }
    }

    /// `Ax`
    pub fn activities(&self, x: &[f64]) -> Vec<f64> {
        let mut xc = vec![0.0; self.numcon()];
        self.A.gemv(&mut xc, x, 1.0, 0.0);
        xc
    }

    /// `Qx`, or zeros without quadratic terms
    pub fn q_times(&self, x: &[f64]) -> Vec<f64> {
        let mut qx = vec![0.0; self.numvar()];
        if let Some(Q) = &self.Q {
            Q.gemv(&mut qx, x, 1.0, 0.0);
        }
        qx
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        let qx = self.q_times(x);
        self.c.dot(x) + 0.5 * qx.dot(x) + self.cfix
    }

    /// The dual objective
    /// `lcᵀslc - ucᵀsuc + lxᵀslx - uxᵀsux - ½xᵀQx + cfix`,
    /// with terms of infinite bounds left out
    pub fn dual_objective(&self, sol: &Solution) -> f64 {
        let qx = self.q_times(&sol.xx);
        bound_dual_value(&self.lc, &self.uc, &sol.slc, &sol.suc)
            + bound_dual_value(&self.lx, &self.ux, &sol.slx, &sol.sux)
            - 0.5 * qx.dot(&sol.xx)
            + self.cfix
    }

    /// Value `lcᵀslc - ucᵀsuc + lxᵀslx - uxᵀsux` of a Farkas certificate
    pub fn farkas_value(&self, sol: &Solution) -> f64 {
        bound_dual_value(&self.lc, &self.uc, &sol.slc, &sol.suc)
            + bound_dual_value(&self.lx, &self.ux, &sol.slx, &sol.sux)
    }

    /// Build a primal infeasibility certificate from row multipliers
    /// `y`.  The bound duals absorb `Aᵀy` so that
    /// `Aᵀy + slx - sux = 0`.
    pub fn farkas_solution(&self, y: &[f64]) -> Solution {
        let (m, n) = (self.numcon(), self.numvar());
        let mut sol = Solution::new(n, m);
        sol.solsta = SolutionStatus::PrimalInfeasibleCertificate;
        sol.prosta = ProblemStatus::PrimalInfeasible;
        sol.y.copy_from_slice(y);
        for i in 0..m {
            sol.slc[i] = y[i].max(0.0);
            sol.suc[i] = (-y[i]).max(0.0);
        }
        let mut r = vec![0.0; n];
        self.A.t().gemv(&mut r, y, 1.0, 0.0);
        for j in 0..n {
            sol.slx[j] = (-r[j]).max(0.0);
            sol.sux[j] = r[j].max(0.0);
        }
        sol.pobj = f64::NAN;
        sol.dobj = self.farkas_value(&sol);
        sol
    }

    /// A dual infeasibility certificate along the ray `x`
    pub fn ray_solution(&self, x: &[f64]) -> Solution {
        let (m, n) = (self.numcon(), self.numvar());
        let mut sol = Solution::new(n, m);
        sol.solsta = SolutionStatus::DualInfeasibleCertificate;
        sol.prosta = ProblemStatus::DualInfeasible;
        sol.xx.copy_from_slice(x);
        sol.xc = self.activities(x);
        sol.pobj = self.c.dot(x);
        sol.dobj = f64::NAN;
        sol
    }

    /// Violation measures of `sol` for this problem
    pub fn solution_info(&self, sol: &Solution) -> SolutionInfo {
        let mut info = SolutionInfo {
            primal_obj: sol.pobj,
            dual_obj: sol.dobj,
            ..SolutionInfo::default()
        };

        // certificates are measured against the homogenized problem
        let farkas = sol.solsta == SolutionStatus::PrimalInfeasibleCertificate;
        let ray = sol.solsta == SolutionStatus::DualInfeasibleCertificate;
        let homogenize = |b: f64| if ray && b.is_finite() { 0.0 } else { b };

        let xc = self.activities(&sol.xx);
        for j in 0..self.numvar() {
            info.max_pbound_viol = info.max_pbound_viol.max(bound_violation(
                sol.xx[j],
                homogenize(self.lx[j]),
                homogenize(self.ux[j]),
            ));
            if self.integer[j] {
                let x = sol.xx[j];
                info.max_pint_viol = info.max_pint_viol.max((x - x.round()).abs());
            }
        }
        for i in 0..self.numcon() {
            info.max_pcon_viol = info
                .max_pcon_viol
                .max(bound_violation(xc[i], homogenize(self.lc[i]), homogenize(self.uc[i])));
        }
        for cone in &self.cones {
            let x: Vec<f64> = cone.members.iter().map(|&j| sol.xx[j]).collect();
            info.max_pcone_viol = info.max_pcone_viol.max(cone_violation(&cone.ctype, &x));
        }

        // dual residual of Aᵀy + slx - sux + snx = c + Qx and the signs
        let mut r = if farkas { vec![0.0; self.numvar()] } else { self.c.clone() };
        if !farkas {
            r.axpby(1.0, &self.q_times(&sol.xx), 1.0);
        }
        self.A.t().gemv(&mut r, &sol.y, -1.0, 1.0);
        for j in 0..self.numvar() {
            r[j] -= sol.slx[j] - sol.sux[j] + sol.snx[j];
        }
        let mut dviol = r.norm_inf();
        for v in [&sol.slc, &sol.suc, &sol.slx, &sol.sux] {
            dviol = dviol.max(-v.minimum().min(0.0));
        }
        // duals of infinite bounds must vanish
        for i in 0..self.numcon() {
            dviol = dviol.max(infinite_side_dual(self.lc[i], sol.slc[i]));
            dviol = dviol.max(infinite_side_dual(self.uc[i], sol.suc[i]));
        }
        for j in 0..self.numvar() {
            dviol = dviol.max(infinite_side_dual(self.lx[j], sol.slx[j]));
            dviol = dviol.max(infinite_side_dual(self.ux[j], sol.sux[j]));
        }
        info.max_dual_viol = dviol;
        info
    }
}

fn bound_dual_value(l: &[f64], u: &[f64], sl: &[f64], su: &[f64]) -> f64 {
    let mut v = 0.0;
    for i in 0..l.len() {
        if l[i].is_finite() {
            v += l[i] * sl[i];
        }
        if u[i].is_finite() {
            v -= u[i] * su[i];
        }
    }
    v
}

fn bound_violation(v: f64, l: f64, u: f64) -> f64 {
    f64::max(0.0, f64::max(l - v, v - u))
}

fn infinite_side_dual(bound: f64, dual: f64) -> f64 {
    if bound.is_finite() {
        0.0
    } else {
        dual.abs()
    }
}

/// Distance-like violation of cone membership for the values `x` of
/// the cone members
pub(crate) fn cone_violation(ctype: &ConeType, x: &[f64]) -> f64 {
    match *ctype {
        ConeType::Quadratic => f64::max(0.0, x[1..].norm() - x[0]),
        ConeType::RotatedQuadratic => {
            let lhs = 2.0 * x[0] * x[1];
            let rhs = x[2..].sumsq();
            f64::max(0.0, f64::max(rhs - lhs, f64::max(-x[0], -x[1])))
        }
        ConeType::PrimalExp => {
            let (x0, x1, x2) = (x[0], x[1], x[2]);
            let sign = f64::max(0.0, f64::max(-x0, -x1));
            if x1 > 0.0 {
                sign.max(x1 * (x2 / x1).exp() - x0)
            } else {
                // closure: x1 = 0 needs x2 ≤ 0
                sign.max(x2)
            }
        }
        ConeType::PrimalPower(α) => {
            let (x0, x1) = (x[0].max(0.0), x[1].max(0.0));
            let sign = f64::max(0.0, f64::max(-x[0], -x[1]));
            sign.max(x[2].abs() - x0.powf(α) * x1.powf(1.0 - α))
        }
        ConeType::PsdTriangle(k) => {
            let mut M = Matrix::<f64>::zeros((k, k));
            svec_to_mat(&mut M, x);
            let mut eig = EigEngine::<f64>::new(k);
            match eig.eigvals(&M) {
                Ok(()) => f64::max(0.0, -eig.λ.minimum()),
                Err(_) => f64::INFINITY,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cone_violation() {
        assert_eq!(cone_violation(&ConeType::Quadratic, &[5.0, 3.0, 4.0]), 0.0);
        assert!((cone_violation(&ConeType::Quadratic, &[4.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cone_violation(&ConeType::RotatedQuadratic, &[1.0, 1.0, 1.0]), 0.0);
        assert!(cone_violation(&ConeType::RotatedQuadratic, &[-1.0, -1.0, 0.0]) > 0.0);
        assert_eq!(cone_violation(&ConeType::PrimalExp, &[3.0, 1.0, 1.0]), 0.0);
        assert!(cone_violation(&ConeType::PrimalExp, &[2.0, 1.0, 1.0]) > 0.0);
        assert_eq!(cone_violation(&ConeType::PrimalPower(0.5), &[4.0, 1.0, 2.0]), 0.0);
        // [[1, 2], [2, 1]] has eigenvalue -1
        let off = 2.0 * std::f64::consts::SQRT_2;
        let v = cone_violation(&ConeType::PsdTriangle(2), &[1.0, off, 1.0]);
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_farkas_solution_is_consistent() {
        // x ≥ 1 (as a row) and x ≤ 0 (as a bound)
        let p = ProblemData {
            A: CscMatrix::from_dense_rows(&[vec![1.0]]),
            c: vec![0.0],
            cfix: 0.0,
            Q: None,
            lc: vec![1.0],
            uc: vec![f64::INFINITY],
            lx: vec![f64::NEG_INFINITY],
            ux: vec![0.0],
            cones: vec![],
            integer: vec![false],
        };
        let sol = p.farkas_solution(&[1.0]);
        assert_eq!(sol.sux[0], 1.0);
        assert_eq!(sol.slx[0], 0.0);
        assert!(sol.dobj > 0.0);
        assert!(p.solution_info(&sol).max_dual_viol < 1e-12);
    }
}
