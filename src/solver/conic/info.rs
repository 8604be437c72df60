use super::*;
use crate::algebra::*;
use crate::timers::*;

/// Progress information of the interior point iteration
#[derive(Default, Debug, Clone)]
pub struct ConicInfo<T> {
    pub μ: T,
    pub sigma: T,
    pub step_length: T,
    pub iterations: u32,
    pub cost_primal: T,
    pub cost_dual: T,
    pub res_primal: T,
    pub res_dual: T,
    pub res_primal_inf: T,
    pub res_dual_inf: T,
    pub gap_abs: T,
    pub gap_rel: T,
    pub ktratio: T,

    // previous iterate
    prev_cost_primal: T,
    prev_cost_dual: T,
    prev_res_primal: T,
    prev_res_dual: T,
    prev_gap_abs: T,
    prev_gap_rel: T,

    pub solve_time: f64,
    pub status: SolverStatus,
}

impl<T> ConicInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;
    }

    pub(crate) fn finalize(
        &mut self,
        residuals: &ConicResiduals<T>,
        settings: &ConicSettings<T>,
        timers: &Timers,
    ) {
        // check for partial convergence after errors or limits
        if self.status.is_errored()
            || matches!(
                self.status,
                SolverStatus::MaxIterations | SolverStatus::MaxTime
            )
        {
            self.check_convergence_almost(residuals, settings);
        }

        self.solve_time = timers.total_time().as_secs_f64();
    }

    pub(crate) fn update(
        &mut self,
        data: &ConicProblemData<T>,
        variables: &ConicVariables<T>,
        residuals: &ConicResiduals<T>,
        timers: &Timers,
    ) {
        // checks are w.r.t. the pre-homogenization x and z
        let τinv = T::recip(variables.τ);

        let dinv = &data.equilibration.dinv;
        let einv = &data.equilibration.einv;
        let cscale = data.equilibration.c;

        // dot products are invariant w.r.t equilibration,
        // up to the overall objective scaling c
        let xPx_τinvsq_over2 = residuals.dot_xPx * τinv * τinv / (2.).as_T();
        self.cost_primal = (residuals.dot_qx * τinv + xPx_τinvsq_over2) / cscale;
        self.cost_dual = (-residuals.dot_bz * τinv - xPx_τinvsq_over2) / cscale;

        let normx = variables.x.norm_scaled(dinv) * τinv;
        let normz = variables.z.norm_scaled(einv) * τinv;
        let norms = variables.s.norm_scaled(einv) * τinv;

        self.res_primal =
            residuals.rz.norm_scaled(einv) * τinv / T::max(T::one(), data.normb + normx + norms);
        self.res_dual =
            residuals.rx.norm_scaled(dinv) * τinv / T::max(T::one(), data.normq + normx + normz);

        self.res_primal_inf = residuals.rx_inf.norm_scaled(dinv) / T::max(T::one(), normz);
        self.res_dual_inf = T::max(
            residuals.Px.norm_scaled(dinv) / T::max(T::one(), normx),
            residuals.rz_inf.norm_scaled(einv) / T::max(T::one(), normx + norms),
        );

        self.gap_abs = T::abs(self.cost_primal - self.cost_dual);
        self.gap_rel = self.gap_abs
            / T::max(
                T::one(),
                T::min(T::abs(self.cost_primal), T::abs(self.cost_dual)),
            );

        self.ktratio = variables.κ / variables.τ;

        self.solve_time = timers.total_time().as_secs_f64();
    }

    pub(crate) fn check_termination(
        &mut self,
        residuals: &ConicResiduals<T>,
        settings: &ConicSettings<T>,
        iter: u32,
    ) -> bool {
        self.check_convergence_full(residuals, settings);

        // poor progress
        if self.status == SolverStatus::Unsolved
            && iter > 1u32
            && (self.res_dual > self.prev_res_dual || self.res_primal > self.prev_res_primal)
        {
            // poor progress at high accuracy
            if self.ktratio < T::epsilon() * (100.).as_T()
                && (self.prev_gap_abs < settings.tol_gap_abs
                    || self.prev_gap_rel < settings.tol_gap_rel)
            {
                self.status = SolverStatus::InsufficientProgress;
            }

            // residuals diverging out of the feasibility tolerance
            if (self.res_dual > settings.tol_feas
                && self.res_dual > self.prev_res_dual * (100.).as_T())
                || (self.res_primal > settings.tol_feas
                    && self.res_primal > self.prev_res_primal * (100.).as_T())
            {
                self.status = SolverStatus::InsufficientProgress;
            }
        }

        if self.status == SolverStatus::Unsolved {
            if settings.max_iter == self.iterations {
                self.status = SolverStatus::MaxIterations;
            } else if self.solve_time > settings.time_limit {
                self.status = SolverStatus::MaxTime;
            }
        }

        self.status != SolverStatus::Unsolved
    }

    pub(crate) fn save_prev_iterate(
        &mut self,
        variables: &ConicVariables<T>,
        prev_variables: &mut ConicVariables<T>,
    ) {
        self.prev_cost_primal = self.cost_primal;
        self.prev_cost_dual = self.cost_dual;
        self.prev_res_primal = self.res_primal;
        self.prev_res_dual = self.res_dual;
        self.prev_gap_abs = self.gap_abs;
        self.prev_gap_rel = self.gap_rel;

        prev_variables.copy_from(variables);
    }

    pub(crate) fn reset_to_prev_iterate(
        &mut self,
        variables: &mut ConicVariables<T>,
        prev_variables: &ConicVariables<T>,
    ) {
        self.cost_primal = self.prev_cost_primal;
        self.cost_dual = self.prev_cost_dual;
        self.res_primal = self.prev_res_primal;
        self.res_dual = self.prev_res_dual;
        self.gap_abs = self.prev_gap_abs;
        self.gap_rel = self.prev_gap_rel;

        variables.copy_from(prev_variables);
    }

    pub(crate) fn save_scalars(&mut self, μ: T, α: T, σ: T, iter: u32) {
        self.μ = μ;
        self.step_length = α;
        self.sigma = σ;
        self.iterations = iter;
    }

    fn check_convergence_full(&mut self, residuals: &ConicResiduals<T>, settings: &ConicSettings<T>) {
        self.check_convergence(
            residuals,
            [
                settings.tol_gap_abs,
                settings.tol_gap_rel,
                settings.tol_feas,
                settings.tol_infeas_abs,
                settings.tol_infeas_rel,
                settings.tol_ktratio,
            ],
            [
                SolverStatus::Solved,
                SolverStatus::PrimalInfeasible,
                SolverStatus::DualInfeasible,
            ],
        );
    }

    fn check_convergence_almost(
        &mut self,
        residuals: &ConicResiduals<T>,
        settings: &ConicSettings<T>,
    ) {
        self.check_convergence(
            residuals,
            [
                settings.reduced_tol_gap_abs,
                settings.reduced_tol_gap_rel,
                settings.reduced_tol_feas,
                settings.reduced_tol_infeas_abs,
                settings.reduced_tol_infeas_rel,
                settings.reduced_tol_ktratio,
            ],
            [
                SolverStatus::AlmostSolved,
                SolverStatus::AlmostPrimalInfeasible,
                SolverStatus::AlmostDualInfeasible,
            ],
        );
    }

    // tolerances are (gap_abs, gap_rel, feas, infeas_abs, infeas_rel, ktratio),
    // statuses are (solved, primal infeasible, dual infeasible)
    fn check_convergence(
        &mut self,
        residuals: &ConicResiduals<T>,
        tols: [T; 6],
        statuses: [SolverStatus; 3],
    ) {
        let [tol_gap_abs, tol_gap_rel, tol_feas, tol_infeas_abs, tol_infeas_rel, tol_ktratio] =
            tols;
        let [solved_status, pinf_status, dinf_status] = statuses;

        if self.ktratio <= T::one() && self.is_solved(tol_gap_abs, tol_gap_rel, tol_feas) {
            self.status = solved_status;
        } else if self.ktratio > tol_ktratio.recip() * (1000.0).as_T() {
            if self.is_primal_infeasible(residuals, tol_infeas_abs, tol_infeas_rel) {
                self.status = pinf_status;
            } else if self.is_dual_infeasible(residuals, tol_infeas_abs, tol_infeas_rel) {
                self.status = dinf_status;
            }
        }
    }

    fn is_solved(&self, tol_gap_abs: T, tol_gap_rel: T, tol_feas: T) -> bool {
        ((self.gap_abs < tol_gap_abs) || (self.gap_rel < tol_gap_rel))
            && (self.res_primal < tol_feas)
            && (self.res_dual < tol_feas)
    }

    fn is_primal_infeasible(
        &self,
        residuals: &ConicResiduals<T>,
        tol_infeas_abs: T,
        tol_infeas_rel: T,
    ) -> bool {
        (residuals.dot_bz < -tol_infeas_abs)
            && (self.res_primal_inf < -tol_infeas_rel * residuals.dot_bz)
    }

    fn is_dual_infeasible(
        &self,
        residuals: &ConicResiduals<T>,
        tol_infeas_abs: T,
        tol_infeas_rel: T,
    ) -> bool {
        (residuals.dot_qx < -tol_infeas_abs)
            && (self.res_dual_inf < -tol_infeas_rel * residuals.dot_qx)
    }
}
