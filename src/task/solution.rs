use super::problem::ProblemData;
use super::types::*;
use crate::solver::simplex::{SimplexSolution, SimplexStatus, VarStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One solution of a task.
///
/// Duals follow the convention `Aᵀy + slx - sux + snx = c + Qx` with
/// `y = slc - suc`.  For a maximization all duals change sign.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    pub solsta: SolutionStatus,
    pub prosta: ProblemStatus,
    /// variable values
    pub xx: Vec<f64>,
    /// constraint activities `Ax`
    pub xc: Vec<f64>,
    pub y: Vec<f64>,
    pub slc: Vec<f64>,
    pub suc: Vec<f64>,
    pub slx: Vec<f64>,
    pub sux: Vec<f64>,
    /// duals of the cone constraints, summed over the cones of each variable
    pub snx: Vec<f64>,
    /// basis status keys of the variables (basic solution only)
    pub skx: Vec<StaKey>,
    /// basis status keys of the constraints (basic solution only)
    pub skc: Vec<StaKey>,
    pub pobj: f64,
    pub dobj: f64,
}

impl Solution {
    pub fn new(numvar: usize, numcon: usize) -> Self {
        Self {
            solsta: SolutionStatus::Unknown,
            prosta: ProblemStatus::Unknown,
            xx: vec![0.0; numvar],
            xc: vec![0.0; numcon],
            y: vec![0.0; numcon],
            slc: vec![0.0; numcon],
            suc: vec![0.0; numcon],
            slx: vec![0.0; numvar],
            sux: vec![0.0; numvar],
            snx: vec![0.0; numvar],
            skx: vec![StaKey::Unknown; numvar],
            skc: vec![StaKey::Unknown; numcon],
            pobj: f64::NAN,
            dobj: f64::NAN,
        }
    }

    pub fn numvar(&self) -> usize {
        self.xx.len()
    }

    pub fn numcon(&self) -> usize {
        self.xc.len()
    }

    /// true for statuses that carry a certificate
    pub fn is_certificate(&self) -> bool {
        matches!(
            self.solsta,
            SolutionStatus::PrimalInfeasibleCertificate | SolutionStatus::DualInfeasibleCertificate
        )
    }

    /// Basis statuses in simplex order: variables then constraints.
    /// `None` if no status keys are known.
    pub(crate) fn var_statuses(&self) -> Option<Vec<VarStatus>> {
        if self.skx.iter().chain(self.skc.iter()).any(|&k| k == StaKey::Unknown) {
            return None;
        }
        let status = self
            .skx
            .iter()
            .chain(self.skc.iter())
            .map(|&k| match k {
                StaKey::Basic => VarStatus::Basic,
                StaKey::AtLower | StaKey::Unknown => VarStatus::AtLower,
                StaKey::AtUpper => VarStatus::AtUpper,
                StaKey::Fixed => VarStatus::Fixed,
                StaKey::SuperBasic => VarStatus::Free,
            })
            .collect();
        Some(status)
    }

    /// Convert a solution of the minimization form back to the sense
    /// of the task.  Certificates do not depend on the sense, except
    /// for the objective of a ray.
    pub(crate) fn apply_sense(&mut self, sense: ObjSense) {
        if sense == ObjSense::Minimize {
            return;
        }
        match self.solsta {
            SolutionStatus::PrimalInfeasibleCertificate => {}
            SolutionStatus::DualInfeasibleCertificate => {
                self.pobj = -self.pobj;
            }
            _ => {
                self.pobj = -self.pobj;
                self.dobj = -self.dobj;
                for v in [
                    &mut self.y,
                    &mut self.slc,
                    &mut self.suc,
                    &mut self.slx,
                    &mut self.sux,
                    &mut self.snx,
                ] {
                    v.iter_mut().for_each(|s| *s = -*s);
                }
            }
        }
    }
}

pub(crate) fn stakey_of(status: VarStatus) -> StaKey {
    match status {
        VarStatus::Basic => StaKey::Basic,
        VarStatus::AtLower => StaKey::AtLower,
        VarStatus::AtUpper => StaKey::AtUpper,
        VarStatus::Fixed => StaKey::Fixed,
        VarStatus::Free => StaKey::SuperBasic,
    }
}

/// Basic solution of `problem` from a simplex result
pub(crate) fn basic_solution(problem: &ProblemData, sx: &SimplexSolution<f64>) -> Solution {
    let (n, m) = (problem.numvar(), problem.numcon());

    match (sx.status, &sx.ray) {
        (SimplexStatus::PrimalInfeasible, Some(y)) => {
            let mut sol = problem.farkas_solution(y);
            set_status_keys(&mut sol, &sx.basis, n);
            return sol;
        }
        (SimplexStatus::DualInfeasible, Some(ray)) => {
            let mut sol = problem.ray_solution(ray);
            set_status_keys(&mut sol, &sx.basis, n);
            return sol;
        }
        _ => {}
    }

    let mut sol = Solution::new(n, m);
    sol.xx.copy_from_slice(&sx.x);
    sol.xc.copy_from_slice(&sx.r);
    sol.y.copy_from_slice(&sx.y);
    for j in 0..n {
        sol.slx[j] = sx.d[j].max(0.0);
        sol.sux[j] = (-sx.d[j]).max(0.0);
    }
    for i in 0..m {
        sol.slc[i] = sx.y[i].max(0.0);
        sol.suc[i] = (-sx.y[i]).max(0.0);
    }
    set_status_keys(&mut sol, &sx.basis, n);

    sol.pobj = problem.objective(&sol.xx);
    sol.dobj = problem.dual_objective(&sol);
    (sol.solsta, sol.prosta) = match sx.status {
        SimplexStatus::Optimal => (SolutionStatus::Optimal, ProblemStatus::PrimalAndDualFeasible),
        _ if sx.primal_feasible => (SolutionStatus::PrimalFeasible, ProblemStatus::Unknown),
        _ => (SolutionStatus::Unknown, ProblemStatus::Unknown),
    };
    sol
}

fn set_status_keys(sol: &mut Solution, basis: &[VarStatus], n: usize) {
    if basis.len() != sol.numvar() + sol.numcon() {
        return;
    }
    for (k, &status) in basis.iter().enumerate() {
        if k < n {
            sol.skx[k] = stakey_of(status);
        } else {
            sol.skc[k - n] = stakey_of(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sense() {
        let mut sol = Solution::new(1, 1);
        sol.solsta = SolutionStatus::Optimal;
        sol.y[0] = 2.0;
        sol.slc[0] = 2.0;
        sol.pobj = -3.0;
        sol.dobj = -3.0;
        sol.apply_sense(ObjSense::Maximize);
        assert_eq!(sol.y[0], -2.0);
        assert_eq!(sol.slc[0], -2.0);
        assert_eq!(sol.pobj, 3.0);

        let mut cert = Solution::new(1, 1);
        cert.solsta = SolutionStatus::PrimalInfeasibleCertificate;
        cert.y[0] = 1.0;
        cert.apply_sense(ObjSense::Maximize);
        assert_eq!(cert.y[0], 1.0);
    }

    #[test]
    fn test_status_round_trip() {
        let mut sol = Solution::new(2, 1);
        assert!(sol.var_statuses().is_none());
        sol.skx = vec![StaKey::Basic, StaKey::AtUpper];
        sol.skc = vec![StaKey::Fixed];
        assert_eq!(
            sol.var_statuses().unwrap(),
            vec![VarStatus::Basic, VarStatus::AtUpper, VarStatus::Fixed]
        );
    }
}
