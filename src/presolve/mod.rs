//! Presolve reductions and their postsolve.
//!
//! The reductions applied, repeated until none applies:
//!
//! * fixed variables outside cones are substituted out, moving their
//!   contribution into the row bounds, the objective and its constant;
//! * empty rows are dropped, or reported infeasible if their bounds
//!   exclude zero;
//! * rows with a single entry become bounds of their variable;
//! * empty columns of continuous variables are fixed at their best
//!   bound, or reported unbounded if that bound is infinite.
//!
//! Every reduction pushes a record onto a stack.  [`Postsolve`] replays
//! the stack backwards to restore primal values, duals and basis status
//! keys of the original problem from a solution of the reduced one.

#![allow(non_snake_case)]

use crate::task::problem::ProblemData;
use crate::task::{Cone, Solution, SolutionStatus, StaKey};

pub(crate) mod scaling;

/// Feasibility tolerance of the reductions
const PRESOLVE_TOL: f64 = 1e-9;

#[derive(Debug, Clone)]
enum Reduction {
    /// variable removed at a fixed value
    FixedVar { j: usize, value: f64, key: StaKey },
    EmptyRow { i: usize },
    /// row `i` with the single entry `a` at variable `j`, turned into
    /// bounds of `j`.  Flags tell which bounds it tightened.
    SingletonRow {
        i: usize,
        j: usize,
        a: f64,
        lower: bool,
        upper: bool,
    },
}

/// Result of [`presolve`]
pub(crate) enum PresolveOutcome {
    Reduced(Box<ProblemData>, Postsolve),
    /// a certificate for the original problem
    Certified(Solution),
}

/// Map from solutions of a reduced problem to the original problem
#[derive(Debug, Clone)]
pub(crate) struct Postsolve {
    stack: Vec<Reduction>,
    // original index of each reduced variable / constraint
    var_map: Vec<usize>,
    con_map: Vec<usize>,
    pub removed_vars: usize,
    pub removed_cons: usize,
}

// working state of the reductions
struct Work<'a> {
    p: &'a ProblemData,
    rows: Vec<Vec<(usize, f64)>>,
    var_active: Vec<bool>,
    con_active: Vec<bool>,
    in_cone: Vec<bool>,
    has_q: Vec<bool>,
    c: Vec<f64>,
    cfix: f64,
    lc: Vec<f64>,
    uc: Vec<f64>,
    lx: Vec<f64>,
    ux: Vec<f64>,
    // row that produced the current lower / upper bound of a variable
    lower_src: Vec<Option<usize>>,
    upper_src: Vec<Option<usize>>,
    stack: Vec<Reduction>,
}

/// Apply the reductions to `p`
pub(crate) fn presolve(p: &ProblemData) -> PresolveOutcome {
    let (m, n) = (p.numcon(), p.numvar());

    let mut rows = vec![Vec::new(); m];
    for j in 0..n {
        let (ri, rv) = p.A.col(j);
        for (&i, &v) in ri.iter().zip(rv) {
            rows[i].push((j, v));
        }
    }
    let mut in_cone = vec![false; n];
    for cone in &p.cones {
        cone.members.iter().for_each(|&j| in_cone[j] = true);
    }
    let mut has_q = vec![false; n];
    if let Some(Q) = &p.Q {
        for j in 0..n {
            has_q[j] = Q.colptr[j] != Q.colptr[j + 1];
        }
    }

    let mut w = Work {
        p,
        rows,
        var_active: vec![true; n],
        con_active: vec![true; m],
        in_cone,
        has_q,
        c: p.c.clone(),
        cfix: p.cfix,
        lc: p.lc.clone(),
        uc: p.uc.clone(),
        lx: p.lx.clone(),
        ux: p.ux.clone(),
        lower_src: vec![None; n],
        upper_src: vec![None; n],
        stack: Vec::new(),
    };

    loop {
        let mut changed = false;
        for j in 0..n {
            if w.var_active[j] && !w.in_cone[j] && w.lx[j] == w.ux[j] {
                w.remove_fixed(j, w.lx[j], StaKey::Fixed);
                changed = true;
            }
        }
        for i in 0..m {
            if !w.con_active[i] {
                continue;
            }
            match w.active_entries(i).as_slice() {
                [] => {
                    if let Some(cert) = w.empty_row(i) {
                        return PresolveOutcome::Certified(cert);
                    }
                    changed = true;
                }
                [(j, a)] => match w.singleton_row(i, *j, *a) {
                    Singleton::Infeasible(cert) => return PresolveOutcome::Certified(cert),
                    Singleton::Reduced => changed = true,
                    Singleton::Kept => {}
                },
                _ => {}
            }
        }
        for j in 0..n {
            if w.var_active[j] && w.column_is_empty(j) {
                match w.empty_column(j) {
                    Some(Err(cert)) => return PresolveOutcome::Certified(cert),
                    Some(Ok(())) => changed = true,
                    None => {}
                }
            }
        }
        if !changed {
            break;
        }
    }

    let (reduced, postsolve) = w.finish();
    log::debug!(
        "presolve removed {} variables and {} constraints",
        postsolve.removed_vars,
        postsolve.removed_cons
    );
    PresolveOutcome::Reduced(Box::new(reduced), postsolve)
}

enum Singleton {
    Reduced,
    Kept,
    Infeasible(Solution),
}

impl<'a> Work<'a> {
    fn active_entries(&self, i: usize) -> Vec<(usize, f64)> {
        self.rows[i]
            .iter()
            .filter(|&&(j, _)| self.var_active[j])
            .copied()
            .collect()
    }

    fn column_is_empty(&self, j: usize) -> bool {
        let (ri, _) = self.p.A.col(j);
        ri.iter().all(|&i| !self.con_active[i])
    }

    fn remove_fixed(&mut self, j: usize, value: f64, key: StaKey) {
        let (ri, rv) = self.p.A.col(j);
        for (&i, &a) in ri.iter().zip(rv) {
            if self.con_active[i] {
                self.lc[i] -= a * value;
                self.uc[i] -= a * value;
            }
        }
        self.cfix += self.c[j] * value;
        if let Some(Q) = &self.p.Q {
            let (qi, qv) = Q.col(j);
            for (&k, &q) in qi.iter().zip(qv) {
                if k == j {
                    self.cfix += 0.5 * q * value * value;
                } else if self.var_active[k] {
                    self.c[k] += q * value;
                }
            }
        }
        self.var_active[j] = false;
        self.stack.push(Reduction::FixedVar { j, value, key });
    }

    fn empty_row(&mut self, i: usize) -> Option<Solution> {
        let (l, u) = (self.lc[i], self.uc[i]);
        if l > PRESOLVE_TOL || u < -PRESOLVE_TOL {
            let mut y = vec![0.0; self.p.numcon()];
            y[i] = if l > PRESOLVE_TOL { 1.0 } else { -1.0 };
            log::debug!("presolve: empty row {} excludes zero", i);
            return Some(self.p.farkas_solution(&y));
        }
        self.con_active[i] = false;
        self.stack.push(Reduction::EmptyRow { i });
        None
    }

    fn singleton_row(&mut self, i: usize, j: usize, a: f64) -> Singleton {
        let (l, u) = if a > 0.0 {
            (self.lc[i] / a, self.uc[i] / a)
        } else {
            (self.uc[i] / a, self.lc[i] / a)
        };

        let new_l = l.max(self.lx[j]);
        let new_u = u.min(self.ux[j]);
        if new_l > new_u + PRESOLVE_TOL * (1.0 + new_l.abs()) {
            // certify against an original bound only
            if l > self.ux[j] && self.upper_src[j].is_none() {
                let mut y = vec![0.0; self.p.numcon()];
                y[i] = a.signum();
                return Singleton::Infeasible(self.p.farkas_solution(&y));
            }
            if u < self.lx[j] && self.lower_src[j].is_none() {
                let mut y = vec![0.0; self.p.numcon()];
                y[i] = -a.signum();
                return Singleton::Infeasible(self.p.farkas_solution(&y));
            }
            return Singleton::Kept;
        }

        let lower = l > self.lx[j];
        let upper = u < self.ux[j];
        if lower {
            self.lx[j] = l;
            self.lower_src[j] = Some(i);
        }
        if upper {
            self.ux[j] = u;
            self.upper_src[j] = Some(i);
        }
        if self.lx[j] > self.ux[j] {
            // crossing within tolerance
            let mid = 0.5 * (self.lx[j] + self.ux[j]);
            self.lx[j] = mid;
            self.ux[j] = mid;
        }
        self.con_active[i] = false;
        self.stack.push(Reduction::SingletonRow { i, j, a, lower, upper });
        Singleton::Reduced
    }

    /// `None` if the column is kept, `Some(Err)` with a ray if the
    /// problem is unbounded along it
    fn empty_column(&mut self, j: usize) -> Option<Result<(), Solution>> {
        if self.in_cone[j] || self.has_q[j] || self.p.integer[j] {
            return None;
        }
        let c = self.c[j];
        let (l, u) = (self.lx[j], self.ux[j]);
        let (value, key) = if c > 0.0 {
            if l == f64::NEG_INFINITY {
                return Some(Err(self.ray(j, -1.0)));
            }
            (l, StaKey::AtLower)
        } else if c < 0.0 {
            if u == f64::INFINITY {
                return Some(Err(self.ray(j, 1.0)));
            }
            (u, StaKey::AtUpper)
        } else if l.is_finite() {
            (l, StaKey::AtLower)
        } else if u.is_finite() {
            (u, StaKey::AtUpper)
        } else {
            (0.0, StaKey::SuperBasic)
        };
        self.remove_fixed(j, value, key);
        Some(Ok(()))
    }

    fn ray(&self, j: usize, dir: f64) -> Solution {
        let mut x = vec![0.0; self.p.numvar()];
        x[j] = dir;
        log::debug!("presolve: empty column {} is unbounded", j);
        self.p.ray_solution(&x)
    }

    fn finish(self) -> (ProblemData, Postsolve) {
        let p = self.p;
        let var_map: Vec<usize> = (0..p.numvar()).filter(|&j| self.var_active[j]).collect();
        let con_map: Vec<usize> = (0..p.numcon()).filter(|&i| self.con_active[i]).collect();

        let mut new_index = vec![usize::MAX; p.numvar()];
        for (k, &j) in var_map.iter().enumerate() {
            new_index[j] = k;
        }

        let A = p.A.select_columns(&var_map).select_rows(&self.con_active);
        let Q = p.Q.as_ref().and_then(|Q| {
            let Q = Q.select_columns(&var_map).select_rows(&self.var_active);
            (Q.nnz() > 0).then_some(Q)
        });
        let cones = p
            .cones
            .iter()
            .map(|k| Cone {
                ctype: k.ctype,
                members: k.members.iter().map(|&j| new_index[j]).collect(),
            })
            .collect();

        let reduced = ProblemData {
            A,
            c: var_map.iter().map(|&j| self.c[j]).collect(),
            cfix: self.cfix,
            Q,
            lc: con_map.iter().map(|&i| self.lc[i]).collect(),
            uc: con_map.iter().map(|&i| self.uc[i]).collect(),
            lx: var_map.iter().map(|&j| self.lx[j]).collect(),
            ux: var_map.iter().map(|&j| self.ux[j]).collect(),
            cones,
            integer: var_map.iter().map(|&j| p.integer[j]).collect(),
        };

        let postsolve = Postsolve {
            removed_vars: p.numvar() - var_map.len(),
            removed_cons: p.numcon() - con_map.len(),
            stack: self.stack,
            var_map,
            con_map,
        };
        (reduced, postsolve)
    }
}

impl Postsolve {
    /// Map warm start statuses of the original problem to the reduced one
    pub fn reduce_statuses<S: Copy>(&self, status: &[S], n: usize) -> Vec<S> {
        self.var_map
            .iter()
            .map(|&j| status[j])
            .chain(self.con_map.iter().map(|&i| status[n + i]))
            .collect()
    }

    /// Restore a solution of the original problem `p` from a solution
    /// of the reduced problem
    pub fn restore(&self, p: &ProblemData, reduced: &Solution) -> Solution {
        match reduced.solsta {
            SolutionStatus::PrimalInfeasibleCertificate => self.restore_farkas(p, reduced),
            SolutionStatus::DualInfeasibleCertificate => {
                let mut x = vec![0.0; p.numvar()];
                for (k, &j) in self.var_map.iter().enumerate() {
                    x[j] = reduced.xx[k];
                }
                let mut sol = p.ray_solution(&x);
                sol.prosta = reduced.prosta;
                sol
            }
            _ => self.restore_solution(p, reduced),
        }
    }

    fn expand(&self, p: &ProblemData, reduced: &Solution) -> Solution {
        let mut sol = Solution::new(p.numvar(), p.numcon());
        sol.solsta = reduced.solsta;
        sol.prosta = reduced.prosta;
        for (k, &j) in self.var_map.iter().enumerate() {
            sol.xx[j] = reduced.xx[k];
            sol.slx[j] = reduced.slx[k];
            sol.sux[j] = reduced.sux[k];
            sol.snx[j] = reduced.snx[k];
            sol.skx[j] = reduced.skx[k];
        }
        for (k, &i) in self.con_map.iter().enumerate() {
            sol.y[i] = reduced.y[k];
            sol.slc[i] = reduced.slc[k];
            sol.suc[i] = reduced.suc[k];
            sol.skc[i] = reduced.skc[k];
        }
        sol
    }

    fn restore_solution(&self, p: &ProblemData, reduced: &Solution) -> Solution {
        let mut sol = self.expand(p, reduced);
        let has_basis = reduced.skx.iter().all(|&k| k != StaKey::Unknown)
            && reduced.skc.iter().all(|&k| k != StaKey::Unknown);

        for red in self.stack.iter().rev() {
            match *red {
                Reduction::FixedVar { j, value, key } => {
                    sol.xx[j] = value;
                    // reduced cost against the duals restored so far
                    let (ri, rv) = p.A.col(j);
                    let mut d = p.c[j] - sol.snx[j];
                    for (&i, &a) in ri.iter().zip(rv) {
                        d -= a * sol.y[i];
                    }
                    if let Some(Q) = &p.Q {
                        let (qi, qv) = Q.col(j);
                        for (&k, &q) in qi.iter().zip(qv) {
                            d += q * sol.xx[k];
                        }
                    }
                    sol.slx[j] = d.max(0.0);
                    sol.sux[j] = (-d).max(0.0);
                    if has_basis {
                        sol.skx[j] = key;
                    }
                }
                Reduction::EmptyRow { i } => {
                    sol.y[i] = 0.0;
                    if has_basis {
                        sol.skc[i] = StaKey::Basic;
                    }
                }
                Reduction::SingletonRow { i, j, a, lower, upper } => {
                    let at_lower = lower && sol.slx[j] > 0.0;
                    let at_upper = upper && sol.sux[j] > 0.0;
                    if at_lower {
                        sol.y[i] = sol.slx[j] / a;
                        sol.slx[j] = 0.0;
                    } else if at_upper {
                        sol.y[i] = -sol.sux[j] / a;
                        sol.sux[j] = 0.0;
                    }

                    if has_basis {
                        let row_side = |var_at_lower: bool| {
                            if p.lc[i] == p.uc[i] {
                                StaKey::Fixed
                            } else if var_at_lower == (a > 0.0) {
                                StaKey::AtLower
                            } else {
                                StaKey::AtUpper
                            }
                        };
                        let var_on_row_bound = match sol.skx[j] {
                            StaKey::AtLower => lower,
                            StaKey::AtUpper => upper,
                            StaKey::Fixed => lower || upper,
                            _ => false,
                        };
                        if var_on_row_bound {
                            let var_at_lower = match sol.skx[j] {
                                StaKey::AtLower => true,
                                StaKey::AtUpper => false,
                                _ => lower && (at_lower || !at_upper),
                            };
                            sol.skc[i] = row_side(var_at_lower);
                            sol.skx[j] = StaKey::Basic;
                        } else {
                            sol.skc[i] = StaKey::Basic;
                        }
                    }
                }
            }
        }

        for i in 0..p.numcon() {
            sol.slc[i] = sol.y[i].max(0.0);
            sol.suc[i] = (-sol.y[i]).max(0.0);
        }
        sol.xc = p.activities(&sol.xx);
        sol.pobj = p.objective(&sol.xx);
        sol.dobj = p.dual_objective(&sol);
        sol
    }

    fn restore_farkas(&self, p: &ProblemData, reduced: &Solution) -> Solution {
        let expanded = self.expand(p, reduced);
        let mut y = expanded.y.clone();
        let mut slx = expanded.slx.clone();
        let mut sux = expanded.sux.clone();
        for red in self.stack.iter().rev() {
            if let Reduction::SingletonRow { i, j, a, lower, upper } = *red {
                if lower && slx[j] > 0.0 {
                    y[i] = slx[j] / a;
                    slx[j] = 0.0;
                } else if upper && sux[j] > 0.0 {
                    y[i] = -sux[j] / a;
                    sux[j] = 0.0;
                }
            }
        }
        let mut sol = p.farkas_solution(&y);
        sol.skx = expanded.skx;
        sol.skc = expanded.skc;
        sol
    }
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
