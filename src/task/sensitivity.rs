//! Sensitivity analysis and solves with the final simplex basis.
//!
//! All quantities come from the optimal basic solution.  Internally the
//! basis is a set of columns of `[A -I]` over structurals `0..n` and
//! logicals `n..n+m`; the basis exposed to users has logical columns
//! `+eᵢ` instead, and the solves flip signs accordingly.

#![allow(non_snake_case)]

use super::problem::ProblemData;
use super::solution::Solution;
use super::*;
use crate::algebra::*;
use crate::lu::{LuError, LuSettings};
use crate::solver::simplex::{column_of, BasisFactor};

const PIVOT_TOL: f64 = 1e-9;

/// Which bound of a constraint or variable is analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitivityMark {
    Lower,
    Upper,
}

/// Rate of change of the optimal objective with respect to one problem
/// value, and the interval of changes over which it holds.
///
/// `left_range ≤ 0 ≤ right_range` are changes relative to the current
/// value.  `left_price` applies to decreases and `right_price` to
/// increases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub left_price: f64,
    pub right_price: f64,
    pub left_range: f64,
    pub right_range: f64,
}

/// Sensitivity of the objective to a bound
pub type PrimalSensitivity = Sensitivity;
/// Sensitivity of the objective to an objective coefficient
pub type DualSensitivity = Sensitivity;

impl Sensitivity {
    fn constant(price: f64, left_range: f64, right_range: f64) -> Self {
        Self {
            left_price: price,
            right_price: price,
            left_range,
            right_range,
        }
    }
}

/// Factorization of the basis of the last basic solution
#[derive(Debug, Clone)]
pub(crate) struct BasisSolve {
    n: usize,
    // basic columns of [A -I]
    head: Vec<usize>,
    factor: BasisFactor<f64>,
}

impl BasisSolve {
    fn new(A: &CscMatrix<f64>, status: &[VarStatus]) -> Result<Self, LuError> {
        let (m, n) = (A.m, A.n);
        let mut head: Vec<usize> = (0..n + m).filter(|&k| status[k] == VarStatus::Basic).collect();
        head.truncate(m);
        // complete with logicals of rows without one
        let mut i = 0;
        while head.len() < m {
            if !head.contains(&(n + i)) {
                head.push(n + i);
            }
            i += 1;
        }
        let repaired = BasisFactor::new_with_repair(A, &mut head, &LuSettings::default())?;
        if !repaired.dropped.is_empty() {
            log::debug!("basis solve: {} singular columns replaced", repaired.dropped.len());
        }
        Ok(Self {
            n,
            head,
            factor: repaired.factor,
        })
    }

    /// Basis in user numbering: constraint `i` as `i`, variable `j` as
    /// `numcon + j`
    fn user_basis(&self) -> Vec<usize> {
        let m = self.head.len();
        self.head
            .iter()
            .map(|&k| if k < self.n { m + k } else { k - self.n })
            .collect()
    }

    /// Solves `Bx = b` or `Bᵀx = b` for the basis in user numbering
    fn solve_user(&mut self, transpose: bool, b: &SparseVector<f64>) -> SparseVector<f64> {
        if transpose {
            let mut rhs = b.clone();
            for (p, v) in rhs.index.iter().zip(rhs.values.iter_mut()) {
                if self.head[*p] >= self.n {
                    *v = -*v;
                }
            }
            self.factor.solve_sparse(&rhs, true)
        } else {
            let mut x = self.factor.solve_sparse(b, false);
            for (p, v) in x.index.iter().zip(x.values.iter_mut()) {
                if self.head[*p] >= self.n {
                    *v = -*v;
                }
            }
            x
        }
    }

    /// `B⁻¹aₖ` for column `k` of `[A -I]`
    fn ftran(&mut self, A: &CscMatrix<f64>, k: usize) -> Vec<f64> {
        let (rows, vals) = column_of(A, k);
        let mut w = vec![0.0; self.head.len()];
        for (i, v) in rows.into_iter().zip(vals) {
            w[i] = v;
        }
        self.factor.solve(&mut w);
        w
    }

    /// `B⁻ᵀeₚ`
    fn btran_unit(&mut self, p: usize) -> Vec<f64> {
        let mut rho = vec![0.0; self.head.len()];
        rho[p] = 1.0;
        self.factor.solve_transpose(&mut rho);
        rho
    }
}

// Optimal basic solution in the minimization form with its statuses
struct BasisPoint {
    problem: ProblemData,
    sol: Solution,
    status: Vec<VarStatus>,
}

impl BasisPoint {
    fn value(&self, k: usize) -> f64 {
        let n = self.problem.numvar();
        if k < n {
            self.sol.xx[k]
        } else {
            self.sol.xc[k - n]
        }
    }

    fn bounds(&self, k: usize) -> (f64, f64) {
        let n = self.problem.numvar();
        if k < n {
            (self.problem.lx[k], self.problem.ux[k])
        } else {
            (self.problem.lc[k - n], self.problem.uc[k - n])
        }
    }

    /// Reduced cost of column `k` of `[A -I]`
    fn reduced_cost(&self, k: usize) -> f64 {
        let n = self.problem.numvar();
        if k < n {
            self.sol.slx[k] - self.sol.sux[k]
        } else {
            self.sol.y[k - n]
        }
    }
}

/// Largest `t ≥ 0` keeping `x + t·dir·w` of the basics within bounds
fn ratio_test(point: &BasisPoint, head: &[usize], w: &[f64], dir: f64) -> f64 {
    let mut t = f64::INFINITY;
    for (p, &k) in head.iter().enumerate() {
        let step = dir * w[p];
        if step.abs() <= PIVOT_TOL {
            continue;
        }
        let v = point.value(k);
        let (l, u) = point.bounds(k);
        let room = if step > 0.0 { u - v } else { v - l };
        t = t.min(room.max(0.0) / step.abs());
    }
    t
}

impl<'env> Task<'env> {
    fn basis_point(&self) -> Result<BasisPoint, OptimizeError> {
        let sol = self.get_solution(SolutionType::Basic).map_err(|_| OptimizeError::NoBasis)?;
        if sol.solsta != SolutionStatus::Optimal {
            return Err(OptimizeError::NoBasis);
        }
        let problem = self.data.to_problem(self.env)?;
        if sol.numvar() != problem.numvar() || sol.numcon() != problem.numcon() {
            return Err(OptimizeError::NoBasis);
        }
        let mut sol = sol.clone();
        sol.apply_sense(self.data.sense);
        let status = sol.var_statuses().ok_or(OptimizeError::NoBasis)?;
        Ok(BasisPoint { problem, sol, status })
    }

    fn ensure_basis_solve(&mut self, point: &BasisPoint) -> Result<(), OptimizeError> {
        if self.basis_solve.is_none() {
            self.basis_solve = Some(BasisSolve::new(&point.problem.A, &point.status)?);
        }
        Ok(())
    }

    /// Factor the basis of the basic solution and return it: entry `p`
    /// is `i < numcon` for the logical of constraint `i` and
    /// `numcon + j` for variable `j`
    pub fn init_basis_solve(&mut self) -> Result<Vec<usize>, OptimizeError> {
        let point = self.basis_point()?;
        self.basis_solve = None;
        self.ensure_basis_solve(&point)?;
        let basis = self.basis_solve.as_ref().ok_or(OptimizeError::NoBasis)?;
        Ok(basis.user_basis())
    }

    /// Solve `Bx = b`, or `Bᵀx = b` if `transpose`, with the basis
    /// returned by [`init_basis_solve`](Self::init_basis_solve).  The
    /// logical column of constraint `i` is the unit vector `eᵢ`.
    pub fn solve_with_basis(
        &mut self,
        transpose: bool,
        b: &SparseVector<f64>,
    ) -> Result<SparseVector<f64>, OptimizeError> {
        let basis = self.basis_solve.as_mut().ok_or(OptimizeError::NoBasis)?;
        if b.n != basis.head.len() {
            return Err(DataError::LengthMismatch {
                expected: basis.head.len(),
                found: b.n,
            }
            .into());
        }
        Ok(basis.solve_user(transpose, b))
    }

    /// Sensitivity of the optimal objective to the bounds marked in
    /// `con_marks` and `var_marks` of the constraints `cons` and
    /// variables `vars`.
    ///
    /// Returns the results for the constraints and for the variables.
    pub fn primal_sensitivity(
        &mut self,
        cons: &[usize],
        con_marks: &[SensitivityMark],
        vars: &[usize],
        var_marks: &[SensitivityMark],
    ) -> Result<(Vec<PrimalSensitivity>, Vec<PrimalSensitivity>), OptimizeError> {
        TaskData::check_len(cons.len(), con_marks.len())?;
        TaskData::check_len(vars.len(), var_marks.len())?;
        for &i in cons {
            self.data.check_con(i)?;
        }
        for &j in vars {
            self.data.check_var(j)?;
        }

        let point = self.basis_point()?;
        self.ensure_basis_solve(&point)?;
        let basis = self.basis_solve.as_mut().ok_or(OptimizeError::NoBasis)?;
        let task_sol = self.solutions[0].as_ref().ok_or(OptimizeError::NoBasis)?;

        let n = point.problem.numvar();
        let mut analyze = |k: usize, mark: SensitivityMark| {
            // prices from the solution in the sense of the task
            let (sl, su) = if k < n {
                (task_sol.slx[k], task_sol.sux[k])
            } else {
                (task_sol.slc[k - n], task_sol.suc[k - n])
            };
            bound_sensitivity(&point, basis, k, mark, sl, su)
        };

        let con_result = cons.iter().zip(con_marks).map(|(&i, &mark)| analyze(n + i, mark)).collect();
        let var_result = vars.iter().zip(var_marks).map(|(&j, &mark)| analyze(j, mark)).collect();
        Ok((con_result, var_result))
    }

    /// Sensitivity of the optimal objective to the objective
    /// coefficients of `vars`.  Linear problems only.
    pub fn dual_sensitivity(&mut self, vars: &[usize]) -> Result<Vec<DualSensitivity>, OptimizeError> {
        for &j in vars {
            self.data.check_var(j)?;
        }
        let point = self.basis_point()?;
        if !point.problem.is_linear() {
            return Err(OptimizeError::NoApplicableOptimizer(
                "sensitivity of objective coefficients needs a linear problem",
            ));
        }
        self.ensure_basis_solve(&point)?;
        let basis = self.basis_solve.as_mut().ok_or(OptimizeError::NoBasis)?;
        let maximize = self.data.sense == ObjSense::Maximize;

        let result = vars
            .iter()
            .map(|&j| {
                let (left, right) = cost_range(&point, basis, j);
                // a maximization has costs -c in the minimization form
                let (left, right) = if maximize { (-right, -left) } else { (left, right) };
                Sensitivity::constant(point.sol.xx[j], left, right)
            })
            .collect();
        Ok(result)
    }
}

fn bound_sensitivity(
    point: &BasisPoint,
    basis: &mut BasisSolve,
    k: usize,
    mark: SensitivityMark,
    sl: f64,
    su: f64,
) -> PrimalSensitivity {
    let (l, u) = point.bounds(k);
    let v = point.value(k);
    let bound = match mark {
        SensitivityMark::Lower => l,
        SensitivityMark::Upper => u,
    };
    if !bound.is_finite() {
        return Sensitivity::constant(0.0, f64::NEG_INFINITY, f64::INFINITY);
    }

    let status = point.status[k];
    let active = matches!(
        (status, mark),
        (VarStatus::Fixed, _) | (VarStatus::AtLower, SensitivityMark::Lower) | (VarStatus::AtUpper, SensitivityMark::Upper)
    );
    if !active {
        return match mark {
            SensitivityMark::Lower => Sensitivity::constant(0.0, f64::NEG_INFINITY, (v - l).max(0.0)),
            SensitivityMark::Upper => Sensitivity::constant(0.0, -(u - v).max(0.0), f64::INFINITY),
        };
    }

    let price = match (status, mark) {
        (VarStatus::Fixed, _) => sl - su,
        (_, SensitivityMark::Lower) => sl,
        (_, SensitivityMark::Upper) => -su,
    };

    // moving the nonbasic value by t moves the basics by -t·B⁻¹aₖ
    let w = basis.ftran(&point.problem.A, k);
    let mut up = ratio_test(point, &basis.head, &w, -1.0);
    let mut down = ratio_test(point, &basis.head, &w, 1.0);
    match (status, mark) {
        (VarStatus::Fixed, _) => {}
        (_, SensitivityMark::Lower) => up = up.min(u - l),
        (_, SensitivityMark::Upper) => down = down.min(u - l),
    }
    Sensitivity::constant(price, -down, up)
}

/// Interval of changes of the minimization cost of variable `j` that
/// keep the basis optimal
fn cost_range(point: &BasisPoint, basis: &mut BasisSolve, j: usize) -> (f64, f64) {
    let d = point.reduced_cost(j);
    match point.status[j] {
        VarStatus::AtLower => return (-d, f64::INFINITY),
        VarStatus::AtUpper => return (f64::NEG_INFINITY, -d),
        VarStatus::Fixed => return (f64::NEG_INFINITY, f64::INFINITY),
        VarStatus::Free => return (-d, -d),
        VarStatus::Basic => {}
    }
    let Some(p) = basis.head.iter().position(|&k| k == j) else {
        return (0.0, 0.0);
    };

    // a change δ of the cost changes the reduced costs by -δ·αₖ
    let rho = basis.btran_unit(p);
    let A = &point.problem.A;
    let (n, m) = (A.n, A.m);
    let (mut lo, mut hi) = (f64::NEG_INFINITY, f64::INFINITY);
    for k in 0..n + m {
        let status = point.status[k];
        if status == VarStatus::Fixed || basis.head.contains(&k) {
            continue;
        }
        let (rows, vals) = column_of(A, k);
        let alpha: f64 = rows.iter().zip(&vals).map(|(&i, &a)| rho[i] * a).sum();
        if alpha.abs() <= PIVOT_TOL {
            continue;
        }
        let dk = point.reduced_cost(k);
        let ratio = dk / alpha;
        match status {
            // need dk - δα ≥ 0
            VarStatus::AtLower if alpha > 0.0 => hi = hi.min(ratio.max(0.0)),
            VarStatus::AtLower => lo = lo.max(ratio.min(0.0)),
            // need dk - δα ≤ 0
            VarStatus::AtUpper if alpha > 0.0 => lo = lo.max(ratio.min(0.0)),
            VarStatus::AtUpper => hi = hi.min(ratio.max(0.0)),
            _ => {
                lo = lo.max(0.0);
                hi = hi.min(0.0);
            }
        }
    }
    (lo, hi)
}
