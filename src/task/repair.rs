//! Primal feasibility repair.
//!
//! Every bound with a nonnegative weight gets an elastic variable that
//! measures its violation.  The repair LP minimizes the weighted sum of
//! the elastic variables over the constraints of the task; bounds with
//! a negative weight stay hard.

#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::callbacks::{CallbackCode, SolverCallbacks};

fn bound_key(l: f64, u: f64) -> BoundKey {
    match (l.is_finite(), u.is_finite()) {
        (true, true) if l == u => BoundKey::Fixed,
        (true, true) => BoundKey::Range,
        (true, false) => BoundKey::Lower,
        (false, true) => BoundKey::Upper,
        (false, false) => BoundKey::Free,
    }
}

// triplets and bounds of the repair LP under construction
#[derive(Default)]
struct ElasticLp {
    I: Vec<usize>,
    J: Vec<usize>,
    V: Vec<f64>,
    c: Vec<f64>,
    lx: Vec<f64>,
    ux: Vec<f64>,
    lc: Vec<f64>,
    uc: Vec<f64>,
}

impl ElasticLp {
    fn add_var(&mut self, cost: f64, l: f64, u: f64) -> usize {
        self.c.push(cost);
        self.lx.push(l);
        self.ux.push(u);
        self.c.len() - 1
    }

    /// Elastic variables for row `i` with bounds `[l, u]`: `+v` covers a
    /// violated lower bound and `-v` a violated upper bound
    fn add_elastic(&mut self, i: usize, l: f64, u: f64, wl: f64, wu: f64) {
        if l.is_finite() && wl >= 0.0 {
            let v = self.add_var(wl, 0.0, f64::INFINITY);
            self.push(i, v, 1.0);
        }
        if u.is_finite() && wu >= 0.0 {
            let v = self.add_var(wu, 0.0, f64::INFINITY);
            self.push(i, v, -1.0);
        }
    }

    fn push(&mut self, i: usize, j: usize, v: f64) {
        self.I.push(i);
        self.J.push(j);
        self.V.push(v);
    }
}

impl<'env> Task<'env> {
    /// Find the point closest to feasibility in the weighted sum of
    /// bound violations.
    ///
    /// `wlc`, `wuc`, `wlx` and `wux` weigh violations of the lower and
    /// upper constraint and variable bounds; a negative weight makes
    /// the bound hard.  The optimal penalty is reported in
    /// [`DouInfItem::PrimalRepairPenaltyObj`] and the repaired point is
    /// stored as the basic solution.  Integer restrictions are ignored.
    pub fn primal_repair(
        &mut self,
        wlc: &[f64],
        wuc: &[f64],
        wlx: &[f64],
        wux: &[f64],
    ) -> Result<TerminationCode, OptimizeError> {
        let (m, n) = (self.data.numcon(), self.data.numvar());
        for w in [wlc, wuc] {
            TaskData::check_len(m, w.len())?;
        }
        for w in [wlx, wux] {
            TaskData::check_len(n, w.len())?;
        }
        let problem = self.data.to_problem(self.env)?;

        // columns 0..n are the variables of the task
        let mut lp = ElasticLp::default();
        for j in 0..n {
            lp.add_var(0.0, problem.lx[j], problem.ux[j]);
        }
        for j in 0..n {
            let (rows, vals) = problem.A.col(j);
            for (&i, &v) in rows.iter().zip(vals) {
                lp.push(i, j, v);
            }
        }
        lp.lc = problem.lc.clone();
        lp.uc = problem.uc.clone();
        for i in 0..m {
            lp.add_elastic(i, problem.lc[i], problem.uc[i], wlc[i], wuc[i]);
        }
        // soft variable bounds become rows lx ≤ x + v⁺ - v⁻ ≤ ux
        for j in 0..n {
            let (l, u) = (problem.lx[j], problem.ux[j]);
            let soft_l = l.is_finite() && wlx[j] >= 0.0;
            let soft_u = u.is_finite() && wux[j] >= 0.0;
            if !soft_l && !soft_u {
                continue;
            }
            let row = lp.lc.len();
            lp.lc.push(l);
            lp.uc.push(u);
            lp.push(row, j, 1.0);
            lp.lx[j] = f64::NEG_INFINITY;
            lp.ux[j] = f64::INFINITY;
            lp.add_elastic(row, l, u, wlx[j], wux[j]);
        }

        let nrows = lp.lc.len();
        let ncols = lp.c.len();
        let A = CscMatrix::new_from_triplets(nrows, ncols, &lp.I, &lp.J, &lp.V);
        let ptrb = &A.colptr[..ncols];
        let ptre = &A.colptr[1..];
        let bkc: Vec<BoundKey> = lp.lc.iter().zip(&lp.uc).map(|(&l, &u)| bound_key(l, u)).collect();
        let bkx: Vec<BoundKey> = lp.lx.iter().zip(&lp.ux).map(|(&l, &u)| bound_key(l, u)).collect();

        let mut params = self.params.clone();
        params.optimizer = OptimizerType::PrimalSimplex;
        let mut repair = Task::from_parts(self.env, TaskData::default(), params);
        repair.input_data(
            nrows, ncols, &lp.c, 0.0, ptrb, ptre, &A.rowval, &A.nzval, &bkc, &lp.lc, &lp.uc, &bkx, &lp.lx, &lp.ux,
        )?;
        log::debug!(
            "primal repair: {} elastic variables, {} bound rows",
            ncols - n,
            nrows - m
        );

        let mut callback = self.take_callback();
        SolverCallbacks::new(callback.as_deref_mut()).notify(Progress::new(CallbackCode::BeginPrimalRepair));
        repair.restore_callback(callback);
        repair.restore_print(self.take_print());

        let result = repair.optimize();

        self.restore_print(repair.take_print());
        let mut callback = repair.take_callback();
        SolverCallbacks::new(callback.as_deref_mut()).notify(Progress::new(CallbackCode::EndPrimalRepair));
        self.restore_callback(callback);
        let termination = result?;

        self.clear_results();
        let repaired = repair.get_solution(SolutionType::Basic)?;
        if repaired.solsta != SolutionStatus::Optimal {
            self.termination = Some(termination);
            return Ok(termination);
        }

        let penalty = repaired.pobj;
        let x = repaired.xx[..n].to_vec();
        let mut sol = Solution::new(n, m);
        sol.xc = problem.activities(&x);
        sol.pobj = match self.data.sense {
            ObjSense::Minimize => problem.objective(&x),
            ObjSense::Maximize => -problem.objective(&x),
        };
        sol.xx = x;
        if penalty <= 1e-9 {
            sol.solsta = SolutionStatus::PrimalFeasible;
        }

        self.info.set_double(DouInfItem::PrimalRepairPenaltyObj, penalty);
        self.set_solution(SolutionType::Basic, Some(sol));
        self.termination = Some(termination);
        Ok(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_repair_conflicting_rows() {
        // x0 + x1 ≤ 1 and x0 + x1 ≥ 3 with x ≥ 0
        let env = Env::new();
        let mut task = Task::new(&env);
        task.put_param("log_level", "0").unwrap();
        task.input_data_dense(
            &[1.0, 1.0],
            0.0,
            &[vec![1.0, 1.0], vec![1.0, 1.0]],
            &[BoundKey::Upper, BoundKey::Lower],
            &[-INF, 3.0],
            &[1.0, INF],
            &[BoundKey::Lower; 2],
            &[0.0; 2],
            &[INF; 2],
        )
        .unwrap();

        let code = task.primal_repair(&[1.0; 2], &[1.0; 2], &[-1.0; 2], &[-1.0; 2]).unwrap();
        assert_eq!(code, TerminationCode::Ok);
        assert!((task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj) - 2.0).abs() < 1e-8);
        let xx = task.get_xx(SolutionType::Basic).unwrap();
        assert!(xx.iter().all(|&v| v >= -1e-9));
        assert!(task.solution_defined(SolutionType::Basic));
    }

    #[test]
    fn test_repair_of_feasible_problem() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.put_param("log_level", "0").unwrap();
        task.input_data_dense(
            &[1.0],
            0.0,
            &[vec![1.0]],
            &[BoundKey::Range],
            &[1.0],
            &[2.0],
            &[BoundKey::Range],
            &[0.0],
            &[5.0],
        )
        .unwrap();
        task.primal_repair(&[1.0], &[1.0], &[1.0], &[1.0]).unwrap();
        assert!(task.get_dou_inf(DouInfItem::PrimalRepairPenaltyObj).abs() < 1e-9);
        assert_eq!(task.get_sol_sta(SolutionType::Basic).unwrap(), SolutionStatus::PrimalFeasible);
    }

    #[test]
    fn test_repair_weight_lengths() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.append_vars(2).unwrap();
        assert!(task.primal_repair(&[], &[], &[1.0], &[1.0, 1.0]).is_err());
    }
}
