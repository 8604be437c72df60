use super::*;
use crate::lu::{LuError, LuSettings};
use crate::solver::callbacks::{CallbackCode, Progress, SolverCallbacks};
use crate::solver::conic::{_exp_str_reformat, expformat};
use crate::timers::Instant;
use std::io::Write;

const NONBASIC: usize = usize::MAX;

// outcome of the ratio test
enum Step<T> {
    Unbounded,
    // the entering variable moves to its opposite bound
    Flip(T),
    Pivot {
        p: usize,
        t: T,
        leave_status: VarStatus,
        leave_value: T,
    },
}

/// Bounded primal simplex on `[A -I](x, r) = 0`.
pub struct PrimalSimplex<'a, T: FloatT> {
    lp: &'a BoundedLp<T>,
    settings: &'a SimplexSettings<T>,
    n: usize,
    m: usize,

    // bounds and costs over (x, r)
    lb: Vec<T>,
    ub: Vec<T>,
    cost: Vec<T>,

    x: Vec<T>,
    status: Vec<VarStatus>,
    head: Vec<usize>,
    pos: Vec<usize>,
    factor: BasisFactor<T>,
    lu_settings: LuSettings<T>,

    // row duals of the last pricing pass
    y: Vec<T>,

    iterations: usize,
    degenerate_run: usize,
    bland: bool,
    repaired_columns: usize,
    unstable_updates: usize,
}

impl<'a, T> PrimalSimplex<'a, T>
where
    T: FloatT,
{
    /// Set up the engine on `lp`, starting from `warm` (statuses of the
    /// structurals then the logicals) if given, or the slack basis.
    pub fn new(
        lp: &'a BoundedLp<T>,
        settings: &'a SimplexSettings<T>,
        warm: Option<&[VarStatus]>,
    ) -> Result<Self, LuError> {
        let (m, n) = (lp.A.m, lp.A.n);
        assert!(lp.c.len() == n && lp.lx.len() == n && lp.ux.len() == n);
        assert!(lp.lc.len() == m && lp.uc.len() == m);

        let lb: Vec<T> = lp.lx.iter().chain(lp.lc.iter()).copied().collect();
        let ub: Vec<T> = lp.ux.iter().chain(lp.uc.iter()).copied().collect();
        let mut cost = lp.c.clone();
        cost.resize(n + m, T::zero());

        let mut status = match warm {
            Some(s) if s.len() == n + m => s.to_vec(),
            _ => {
                let mut s = vec![VarStatus::AtLower; n];
                s.resize(n + m, VarStatus::Basic);
                s
            }
        };
        for k in 0..(n + m) {
            if status[k] != VarStatus::Basic {
                status[k] = nonbasic_status(status[k], lb[k], ub[k]);
            }
        }

        // exactly m basics, topping up with logicals
        let mut head: Vec<usize> = (0..(n + m))
            .filter(|&k| status[k] == VarStatus::Basic)
            .collect();
        while head.len() > m {
            if let Some(k) = head.pop() {
                status[k] = nonbasic_status(VarStatus::AtLower, lb[k], ub[k]);
            }
        }
        for i in 0..m {
            if head.len() == m {
                break;
            }
            if status[n + i] != VarStatus::Basic {
                status[n + i] = VarStatus::Basic;
                head.push(n + i);
            }
        }

        let lu_settings = LuSettings::default();
        let repaired = BasisFactor::new_with_repair(&lp.A, &mut head, &lu_settings)?;

        let mut x = vec![T::zero(); n + m];
        for k in 0..(n + m) {
            x[k] = nonbasic_value(status[k], lb[k], ub[k]);
        }

        let mut solver = Self {
            lp,
            settings,
            n,
            m,
            lb,
            ub,
            cost,
            x,
            status,
            head,
            pos: vec![NONBASIC; n + m],
            factor: repaired.factor,
            lu_settings,
            y: vec![T::zero(); m],
            iterations: 0,
            degenerate_run: 0,
            bland: settings.pricing == PricingRule::Bland,
            repaired_columns: 0,
            unstable_updates: 0,
        };
        solver.apply_repair(&repaired.dropped);
        solver.sync_head();
        solver.compute_basic_values();
        Ok(solver)
    }

    /// Run the simplex to termination, writing the iteration log to `out`
    pub(crate) fn solve(&mut self, out: &mut dyn Write, callbacks: &mut SolverCallbacks) -> SimplexSolution<T> {
        let start = Instant::now();
        let tol = self.settings.tol_primal;

        callbacks.notify(Progress::new(CallbackCode::BeginPrimalSimplex));
        if self.settings.verbose {
            let _ = writeln!(out, "Primal simplex: {} rows, {} columns, {} nonzeros", self.m, self.n, self.lp.A.nnz());
            let _ = writeln!(out, "{:>7}  {:>5}  {:>14}  {:>9}", "iter", "phase", "objective", "infeas");
        }

        let mut phase1 = true;
        let status = loop {
            if self.factor.num_updates() >= self.settings.refactor_freq && self.refactor().is_err() {
                break SimplexStatus::NumericalError;
            }

            let infeas = self.primal_infeasibility();
            phase1 = infeas > tol;
            self.price_duals(phase1);

            if self.settings.verbose && self.iterations % 50 == 0 {
                self.print_iteration(out, phase1, infeas);
            }

            let progress = Progress {
                iterations: self.iterations as u32,
                primal_obj: self.objective().to_f64().unwrap_or(f64::NAN),
                ..Progress::new(CallbackCode::UpdatePrimalSimplex)
            };
            if callbacks.notify(progress) {
                break SimplexStatus::CallbackTerminated;
            }
            let Some((q, dir)) = self.select_entering(phase1) else {
                // confirm on fresh factors before concluding
                if self.factor.num_updates() > 0 {
                    if self.refactor().is_err() {
                        break SimplexStatus::NumericalError;
                    }
                    continue;
                }
                break if phase1 {
                    SimplexStatus::PrimalInfeasible
                } else {
                    SimplexStatus::Optimal
                };
            };

            // limits apply to pivots only
            if self.iterations >= self.settings.max_iter {
                break SimplexStatus::MaxIterations;
            }
            if start.elapsed().as_secs_f64() > self.settings.time_limit {
                break SimplexStatus::MaxTime;
            }

            let w = self.ftran_column(q);

            match self.ratio_test(q, dir, phase1, &w) {
                Step::Unbounded => {
                    if phase1 {
                        // phase 1 is bounded below, so this is drift
                        if self.factor.num_updates() > 0 && self.refactor().is_ok() {
                            continue;
                        }
                        break SimplexStatus::NumericalError;
                    }
                    let ray = self.unbounded_ray(q, dir, &w);
                    let mut sol = self.make_solution(SimplexStatus::DualInfeasible, false);
                    sol.ray = Some(ray);
                    return self.finish(out, callbacks, sol);
                }
                Step::Flip(t) => {
                    self.move_along(q, dir, t, &w);
                    self.status[q] = match self.status[q] {
                        VarStatus::AtLower => VarStatus::AtUpper,
                        _ => VarStatus::AtLower,
                    };
                    self.x[q] = nonbasic_value(self.status[q], self.lb[q], self.ub[q]);
                    self.track_degeneracy(t);
                }
                Step::Pivot {
                    p,
                    t,
                    leave_status,
                    leave_value,
                } => {
                    self.move_along(q, dir, t, &w);
                    let k = self.head[p];
                    self.x[k] = leave_value;
                    self.status[k] = leave_status;
                    self.pos[k] = NONBASIC;
                    self.head[p] = q;
                    self.pos[q] = p;
                    self.status[q] = VarStatus::Basic;
                    self.factor.update(p, &w);
                    self.track_degeneracy(t);
                }
            }
            self.iterations += 1;
        };

        let feasible = !phase1;
        let mut sol = self.make_solution(status, feasible);
        if status == SimplexStatus::PrimalInfeasible {
            sol.ray = Some(self.y.clone());
        }
        self.finish(out, callbacks, sol)
    }

    fn finish(
        &mut self,
        out: &mut dyn Write,
        callbacks: &mut SolverCallbacks,
        sol: SimplexSolution<T>,
    ) -> SimplexSolution<T> {
        if self.settings.verbose {
            let infeas = self.primal_infeasibility();
            self.print_iteration(out, !sol.primal_feasible, infeas);
            let _ = writeln!(out, "Simplex terminated with status {:?}", sol.status);
        }
        log::debug!(
            "simplex finished: {:?} after {} iterations, {} repaired columns",
            sol.status,
            sol.iterations,
            sol.repaired_columns
        );
        callbacks.notify(Progress {
            iterations: self.iterations as u32,
            primal_obj: self.objective().to_f64().unwrap_or(f64::NAN),
            ..Progress::new(CallbackCode::EndPrimalSimplex)
        });
        sol
    }

    fn print_iteration(&self, out: &mut dyn Write, phase1: bool, infeas: T) {
        let _ = writeln!(
            out,
            "{:>7}  {:>5}  {:>14}  {:>9}",
            self.iterations,
            if phase1 { 1 } else { 2 },
            expformat!("{:+.7e}", self.objective()),
            expformat!("{:.2e}", infeas),
        );
    }

    fn make_solution(&self, status: SimplexStatus, primal_feasible: bool) -> SimplexSolution<T> {
        let (n, A) = (self.n, &self.lp.A);
        let x = self.x[..n].to_vec();
        let r = self.x[n..].to_vec();

        // d = c - Aᵀy
        let mut d = self.lp.c.clone();
        A.t().gemv(&mut d, &self.y, -T::one(), T::one());

        SimplexSolution {
            status,
            x,
            r,
            y: self.y.clone(),
            d,
            basis: self.status.clone(),
            ray: None,
            iterations: self.iterations,
            primal_feasible,
            repaired_columns: self.repaired_columns,
            unstable_updates: self.unstable_updates,
        }
    }

    fn objective(&self) -> T {
        self.lp.c.dot(&self.x[..self.n])
    }

    fn sync_head(&mut self) {
        self.pos.iter_mut().for_each(|p| *p = NONBASIC);
        for (p, &k) in self.head.iter().enumerate() {
            self.pos[k] = p;
            self.status[k] = VarStatus::Basic;
        }
    }

    fn apply_repair(&mut self, dropped: &[usize]) {
        for &k in dropped {
            self.status[k] = nonbasic_nearest(self.x[k], self.lb[k], self.ub[k]);
            self.x[k] = nonbasic_value(self.status[k], self.lb[k], self.ub[k]);
        }
        self.repaired_columns += dropped.len();
    }

    fn refactor(&mut self) -> Result<(), LuError> {
        let before: Vec<T> = self.head.iter().map(|&k| self.x[k]).collect();
        let repaired = BasisFactor::new_with_repair(&self.lp.A, &mut self.head, &self.lu_settings)?;
        self.factor = repaired.factor;
        self.apply_repair(&repaired.dropped);
        self.sync_head();
        self.compute_basic_values();

        if repaired.dropped.is_empty() {
            let drift = self
                .head
                .iter()
                .zip(before.iter())
                .map(|(&k, &v)| (self.x[k] - v).abs() / (T::one() + v.abs()))
                .fold(T::zero(), T::max);
            if drift > (1e-6).as_T() {
                log::debug!("simplex refactorization found drift {:e}", drift);
                self.unstable_updates += 1;
            }
        }
        Ok(())
    }

    // x_B = B⁻¹(-N x_N)
    fn compute_basic_values(&mut self) {
        let (n, A) = (self.n, &self.lp.A);
        let mut rhs = vec![T::zero(); self.m];
        for k in 0..(n + self.m) {
            if self.status[k] == VarStatus::Basic || self.x[k] == T::zero() {
                continue;
            }
            if k < n {
                let (rows, vals) = A.col(k);
                for (&i, &v) in rows.iter().zip(vals) {
                    rhs[i] -= v * self.x[k];
                }
            } else {
                rhs[k - n] += self.x[k];
            }
        }
        self.factor.solve(&mut rhs);
        for (p, &k) in self.head.iter().enumerate() {
            self.x[k] = rhs[p];
        }
    }

    fn primal_infeasibility(&self) -> T {
        self.head
            .iter()
            .map(|&k| {
                let x = self.x[k];
                T::max(self.lb[k] - x, T::zero()) + T::max(x - self.ub[k], T::zero())
            })
            .fold(T::zero(), |acc, v| acc + v)
    }

    // y = B⁻ᵀc_B for the phase 1 or phase 2 costs
    fn price_duals(&mut self, phase1: bool) {
        let tol = self.settings.tol_primal;
        for (p, &k) in self.head.iter().enumerate() {
            self.y[p] = if phase1 {
                let x = self.x[k];
                if x < self.lb[k] - tol {
                    -T::one()
                } else if x > self.ub[k] + tol {
                    T::one()
                } else {
                    T::zero()
                }
            } else {
                self.cost[k]
            };
        }
        self.factor.solve_transpose(&mut self.y);
    }

    fn reduced_cost(&self, k: usize, phase1: bool) -> T {
        let ck = if phase1 { T::zero() } else { self.cost[k] };
        if k < self.n {
            let (rows, vals) = self.lp.A.col(k);
            let mut d = ck;
            for (&i, &v) in rows.iter().zip(vals) {
                d -= v * self.y[i];
            }
            d
        } else {
            ck + self.y[k - self.n]
        }
    }

    // entering variable and its direction (+1 increase, -1 decrease)
    fn select_entering(&self, phase1: bool) -> Option<(usize, T)> {
        let tol = self.settings.tol_dual;
        let mut best: Option<(usize, T, T)> = None;

        for k in 0..(self.n + self.m) {
            let can_increase = matches!(self.status[k], VarStatus::AtLower | VarStatus::Free);
            let can_decrease = matches!(self.status[k], VarStatus::AtUpper | VarStatus::Free);
            if !can_increase && !can_decrease {
                continue;
            }
            let d = self.reduced_cost(k, phase1);
            let dir = if can_increase && d < -tol {
                T::one()
            } else if can_decrease && d > tol {
                -T::one()
            } else {
                continue;
            };
            if self.bland {
                return Some((k, dir));
            }
            match best {
                Some((_, _, score)) if d.abs() <= score => {}
                _ => best = Some((k, dir, d.abs())),
            }
        }
        best.map(|(k, dir, _)| (k, dir))
    }

    fn ftran_column(&mut self, q: usize) -> Vec<T> {
        let mut w = vec![T::zero(); self.m];
        let (rows, vals) = column_of(&self.lp.A, q);
        for (i, v) in rows.into_iter().zip(vals) {
            w[i] = v;
        }
        self.factor.solve(&mut w);
        w
    }

    // phase 1 relaxes the violated side of infeasible basics so that
    // they block at their first breakpoint
    fn effective_bounds(&self, k: usize, phase1: bool) -> (T, VarStatus, T, VarStatus) {
        let (l, u, x) = (self.lb[k], self.ub[k], self.x[k]);
        let tol = self.settings.tol_primal;
        if phase1 && x < l - tol {
            (T::neg_infinity(), VarStatus::AtLower, l, VarStatus::AtLower)
        } else if phase1 && x > u + tol {
            (u, VarStatus::AtUpper, T::infinity(), VarStatus::AtUpper)
        } else {
            (l, VarStatus::AtLower, u, VarStatus::AtUpper)
        }
    }

    fn ratio_test(&self, q: usize, dir: T, phase1: bool, w: &[T]) -> Step<T> {
        let tol_pivot = self.settings.tol_pivot;

        // (t, |α|, variable, position, status, value)
        let mut best: Option<(T, T, usize, usize, VarStatus, T)> = None;

        for (p, &k) in self.head.iter().enumerate() {
            let α = -dir * w[p];
            if α.abs() <= tol_pivot {
                continue;
            }
            let (lo, lo_status, hi, hi_status) = self.effective_bounds(k, phase1);
            let (t, status, value) = if α < T::zero() {
                if !lo.is_finite() {
                    continue;
                }
                ((self.x[k] - lo) / (-α), lo_status, lo)
            } else {
                if !hi.is_finite() {
                    continue;
                }
                ((hi - self.x[k]) / α, hi_status, hi)
            };
            let t = T::max(t, T::zero());

            let replace = match best {
                None => true,
                Some((bt, babs, bk, ..)) => {
                    let eps: T = (1e-12).as_T();
                    let tie = eps * T::max(T::one(), bt);
                    if t < bt - tie {
                        true
                    } else if t <= bt + tie {
                        α.abs() > babs || (α.abs() == babs && k < bk)
                    } else {
                        false
                    }
                }
            };
            if replace {
                best = Some((t, α.abs(), k, p, status, value));
            }
        }

        let flip = self.ub[q] - self.lb[q];
        let flip_ok = flip.is_finite();

        match best {
            Some((t, _, k, p, status, value)) if !flip_ok || t < flip => {
                let leave_status = if self.lb[k] == self.ub[k] {
                    VarStatus::Fixed
                } else {
                    status
                };
                Step::Pivot {
                    p,
                    t,
                    leave_status,
                    leave_value: value,
                }
            }
            _ if flip_ok => Step::Flip(flip),
            _ => Step::Unbounded,
        }
    }

    fn move_along(&mut self, q: usize, dir: T, t: T, w: &[T]) {
        if t == T::zero() {
            return;
        }
        self.x[q] += dir * t;
        for (p, &k) in self.head.iter().enumerate() {
            self.x[k] -= dir * t * w[p];
        }
    }

    fn track_degeneracy(&mut self, t: T) {
        if t <= (1e-12).as_T() {
            self.degenerate_run += 1;
            if !self.bland && self.degenerate_run >= self.settings.degen_switch {
                log::debug!("simplex: {} degenerate pivots, switching to Bland's rule", self.degenerate_run);
                self.bland = true;
            }
        } else {
            self.degenerate_run = 0;
            self.bland = self.settings.pricing == PricingRule::Bland;
        }
    }

    // ray over the structurals along which the objective decreases
    // without bound
    fn unbounded_ray(&self, q: usize, dir: T, w: &[T]) -> Vec<T> {
        let mut ray = vec![T::zero(); self.n + self.m];
        ray[q] = dir;
        for (p, &k) in self.head.iter().enumerate() {
            ray[k] = -dir * w[p];
        }
        ray.truncate(self.n);
        ray
    }
}

fn nonbasic_status<T: FloatT>(preferred: VarStatus, l: T, u: T) -> VarStatus {
    if l == u && l.is_finite() {
        return VarStatus::Fixed;
    }
    match preferred {
        VarStatus::AtUpper if u.is_finite() => VarStatus::AtUpper,
        VarStatus::Free if !l.is_finite() && !u.is_finite() => VarStatus::Free,
        _ if l.is_finite() => VarStatus::AtLower,
        _ if u.is_finite() => VarStatus::AtUpper,
        _ => VarStatus::Free,
    }
}

fn nonbasic_nearest<T: FloatT>(x: T, l: T, u: T) -> VarStatus {
    if u.is_finite() && (!l.is_finite() || (u - x).abs() < (x - l).abs()) {
        nonbasic_status(VarStatus::AtUpper, l, u)
    } else {
        nonbasic_status(VarStatus::AtLower, l, u)
    }
}

fn nonbasic_value<T: FloatT>(status: VarStatus, l: T, u: T) -> T {
    match status {
        VarStatus::AtLower | VarStatus::Fixed => l,
        VarStatus::AtUpper => u,
        _ => T::zero(),
    }
}

/// Solve `lp` with the primal simplex from the slack basis or `warm`
pub(crate) fn solve_lp<T: FloatT>(
    lp: &BoundedLp<T>,
    settings: &SimplexSettings<T>,
    warm: Option<&[VarStatus]>,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
) -> Result<SimplexSolution<T>, LuError> {
    let mut engine = PrimalSimplex::new(lp, settings, warm)?;
    Ok(engine.solve(out, callbacks))
}
