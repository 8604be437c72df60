#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::qdldl::QDLDLError;
use crate::solver::callbacks::{CallbackCode, Progress, SolverCallbacks};
use crate::solver::conic::cones::{CompositeCone, Cone, ScalingStrategy, SupportedConeT};
use crate::timers::*;
use std::io::Write;
use thiserror::Error;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of the interior point engine at termination
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Problem is primal infeasible.  Solution returned is a certificate of primal infeasibility.
    PrimalInfeasible,
    /// Problem is dual infeasible.  Solution returned is a certificate of dual infeasibility.
    DualInfeasible,
    /// Solver terminated with a solution (reduced accuracy)
    AlmostSolved,
    /// Primal infeasibility certificate (reduced accuracy).
    AlmostPrimalInfeasible,
    /// Dual infeasibility certificate (reduced accuracy).
    AlmostDualInfeasible,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterations,
    /// Time limit reached before solution or infeasibility certificate found.
    MaxTime,
    /// Solver terminated with a numerical error
    NumericalError,
    /// Solver terminated due to lack of progress.
    InsufficientProgress,
    /// Solver terminated at the request of the progress callback
    CallbackTerminated,
}

impl SolverStatus {
    pub(crate) fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible
                | SolverStatus::DualInfeasible
                | SolverStatus::AlmostPrimalInfeasible
                | SolverStatus::AlmostDualInfeasible
        )
    }

    pub(crate) fn is_errored(&self) -> bool {
        matches!(
            *self,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum StepDirection {
    Affine,
    Combined,
}

/// Outcome of a scaling strategy checkpoint
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
enum StrategyCheckpoint {
    // switch to a new ScalingStrategy
    Update(ScalingStrategy),
    NoUpdate,
    // a problem with no more strategies to try
    Fail,
}

/// Error type returned by [`ConicSolver::new`]
#[derive(Error, Debug)]
pub enum ConicSolverError {
    #[error("Problem data dimensions are incompatible")]
    IncompatibleDimension,
    #[error("Cone dimensions do not match the number of constraints")]
    IncompatibleConeDimension,
    #[error("Bad cone specification: {0}")]
    BadCone(&'static str),
    #[error("KKT factorization could not be set up: {0}")]
    Factorization(#[from] QDLDLError),
}

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Homogeneous embedding interior point solver for
///
/// ```text
/// min  ½xᵀPx + qᵀx   s.t.  Ax + s = b,  s ∈ K
/// ```
pub struct ConicSolver<T: FloatT> {
    pub data: ConicProblemData<T>,
    pub variables: ConicVariables<T>,
    pub residuals: ConicResiduals<T>,
    pub(crate) kktsystem: ConicKKTSystem<T>,
    pub cones: CompositeCone<T>,
    pub step_lhs: ConicVariables<T>,
    pub step_rhs: ConicVariables<T>,
    pub prev_vars: ConicVariables<T>,
    pub info: ConicInfo<T>,
    pub solution: ConicSolution<T>,
    pub settings: ConicSettings<T>,
    pub timers: Option<Timers>,
}

impl<T> ConicSolver<T>
where
    T: FloatT,
{
    /// Set up a solver.  The data is copied, equilibrated and the
    /// KKT matrix analysed here.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT<T>],
        settings: ConicSettings<T>,
    ) -> Result<Self, ConicSolverError> {
        check_dimensions(P, q, A, b, cone_types)?;

        let mut timers = Timers::default();
        let mut output;

        timeit! {timers => "setup"; {

        let cones = CompositeCone::<T>::new(cone_types);
        let mut data = ConicProblemData::<T>::new(P, q, A, b);

        timeit! {timers => "equilibration"; {
            data.equilibrate(&cones, &settings);
        }}

        let kktsystem;
        timeit! {timers => "kktinit"; {
            kktsystem = ConicKKTSystem::<T>::new(&data, &cones, &settings)?;
        }}

        let (m, n) = (data.m, data.n);

        output = Self {
            data,
            variables: ConicVariables::<T>::new(n, m),
            residuals: ConicResiduals::<T>::new(n, m),
            kktsystem,
            cones,
            step_lhs: ConicVariables::<T>::new(n, m),
            step_rhs: ConicVariables::<T>::new(n, m),
            prev_vars: ConicVariables::<T>::new(n, m),
            info: ConicInfo::<T>::new(),
            solution: ConicSolution::<T>::new(n, m),
            settings,
            timers: None,
        };

        }}

        output.timers.replace(timers);
        Ok(output)
    }

    /// Run the solver, writing the iteration log to `out`
    pub(crate) fn solve(&mut self, out: &mut dyn Write, callbacks: &mut SolverCallbacks) {
        let mut iter: u32 = 0;
        let mut σ = T::one();
        let mut α = T::zero();
        let mut μ;

        // swapped out to avoid borrow conflicts
        let mut timers = self.timers.take().unwrap_or_default();

        // the log stream is observational only, so write errors are dropped
        notimeit! {timers; {
            let _ = self.info.print_configuration(out, &self.settings, &self.data, &self.cones);
            let _ = self.info.print_status_header(out, &self.settings);
        }}

        self.info.reset();
        callbacks.notify(Progress::new(CallbackCode::BeginIntpnt));

        timeit! {timers => "solve"; {

        timeit!{timers => "default start"; {
            self.default_start();
        }}

        timeit!{timers => "IP iteration"; {

        let mut scaling = {
            if self.cones.allows_primal_dual_scaling() {ScalingStrategy::PrimalDual}
            else {ScalingStrategy::Dual}
        };

        loop {

            self.residuals.update(&self.variables, &self.data);

            μ = self.variables.calc_mu(&self.residuals, &self.cones);

            // captures μ at iteration zero
            self.info.save_scalars(μ, α, σ, iter);

            self.info.update(&self.data, &self.variables, &self.residuals, &timers);

            notimeit!{timers; {
                let _ = self.info.print_status(out, &self.settings);
            }}

            let isdone = self.info.check_termination(&self.residuals, &self.settings, iter);

            if isdone {
                match self.strategy_checkpoint_insufficient_progress(scaling) {
                    StrategyCheckpoint::NoUpdate | StrategyCheckpoint::Fail => {break}
                    StrategyCheckpoint::Update(s) => {scaling = s; continue}
                }
            }

            // cooperative termination at the iteration boundary
            let progress = Progress {
                iterations: iter,
                primal_obj: self.info.cost_primal.to_f64().unwrap_or(f64::NAN),
                dual_obj: self.info.cost_dual.to_f64().unwrap_or(f64::NAN),
                mu: μ.to_f64().unwrap_or(f64::NAN),
                ..Progress::new(CallbackCode::IntpntIter)
            };
            if callbacks.notify(progress) {
                self.info.status = SolverStatus::CallbackTerminated;
                break;
            }

            let is_scaling_success = self.variables.scale_cones(&mut self.cones, μ, scaling);
            if let StrategyCheckpoint::Fail = self.strategy_checkpoint_is_scaling_success(is_scaling_success) {
                break;
            }

            // only iterations with a KKT update are counted
            iter += 1;

            let mut is_kkt_solve_success : bool;
            timeit!{timers => "kkt update"; {
                is_kkt_solve_success = self.kktsystem.update(&self.data, &self.cones, &self.settings);
            }}

            // affine step
            // --------------
            self.step_rhs
                .affine_step_rhs(&self.residuals, &self.variables, &self.cones);

            timeit!{timers => "kkt solve"; {
                is_kkt_solve_success = is_kkt_solve_success &&
                self.kktsystem.solve(
                    &mut self.step_lhs,
                    &self.step_rhs,
                    &self.data,
                    &self.variables,
                    &mut self.cones,
                    StepDirection::Affine,
                    &self.settings,
                );
            }}

            if is_kkt_solve_success {

                α = self.get_step_length(StepDirection::Affine, scaling);
                σ = self.centering_parameter(α);

                // reduced Mehrotra correction in the first iteration
                // for badly centred starting points
                let m = if iter > 1 {T::one()} else {α};

                // combined step
                // --------------
                self.step_rhs.combined_step_rhs(
                    &self.residuals,
                    &self.variables,
                    &mut self.cones,
                    &mut self.step_lhs,
                    σ,
                    μ,
                    m
                );

                timeit!{timers => "kkt solve" ; {
                    is_kkt_solve_success =
                    self.kktsystem.solve(
                        &mut self.step_lhs,
                        &self.step_rhs,
                        &self.data,
                        &self.variables,
                        &mut self.cones,
                        StepDirection::Combined,
                        &self.settings,
                    );
                }}
            }

            match self.strategy_checkpoint_numerical_error(is_kkt_solve_success, scaling) {
                StrategyCheckpoint::NoUpdate => {}
                StrategyCheckpoint::Update(s) => {α = T::zero(); scaling = s; continue}
                StrategyCheckpoint::Fail => {α = T::zero(); break}
            }

            α = self.get_step_length(StepDirection::Combined, scaling);

            match self.strategy_checkpoint_small_step(α, scaling) {
                StrategyCheckpoint::NoUpdate => {}
                StrategyCheckpoint::Update(s) => {α = T::zero(); scaling = s; continue}
                StrategyCheckpoint::Fail => {α = T::zero(); break}
            }

            // keep the previous iterate in case the next one is a dud
            self.info.save_prev_iterate(&self.variables, &mut self.prev_vars);

            self.variables.add_step(&self.step_lhs, α);

        } //end loop

        }} //end "IP iteration" timer

        }} // end "solve" timer

        // no final step taken, so print the last line again
        if α == T::zero() {
            self.info.save_scalars(μ, α, σ, iter);
            notimeit! {timers; {let _ = self.info.print_status(out, &self.settings);}}
        }

        self.info.finalize(&self.residuals, &self.settings, &timers);

        self.solution
            .post_process(&self.data, &mut self.variables, &self.info);
        self.solution.finalize(&self.info);

        let _ = self.info.print_footer(out, &self.settings);

        callbacks.notify(Progress {
            iterations: self.info.iterations,
            primal_obj: self.solution.obj_val.to_f64().unwrap_or(f64::NAN),
            dual_obj: self.solution.obj_val_dual.to_f64().unwrap_or(f64::NAN),
            ..Progress::new(CallbackCode::EndIntpnt)
        });

        log::debug!(
            "interior point finished: status {}, {} iterations, {} KKT retries",
            self.info.status,
            self.info.iterations,
            self.kktsystem.retry_count()
        );

        self.timers.replace(timers);
    }

    /// number of KKT factorizations that needed a regularized retry
    pub fn factorization_retries(&self) -> usize {
        self.kktsystem.retry_count()
    }

    fn default_start(&mut self) {
        if self.cones.is_symmetric() {
            // identity scalings (zero for the zero cone)
            self.cones.set_identity_scaling();
            self.kktsystem
                .update(&self.data, &self.cones, &self.settings);
            self.kktsystem
                .solve_initial_point(&mut self.variables, &self.data, &self.settings);
            // push (z,s) into the cone interior
            self.variables.symmetric_initialization(&mut self.cones);
        } else {
            // unit (z,s) and zero x
            self.variables.unit_initialization(&self.cones);
        }
    }

    fn centering_parameter(&self, α: T) -> T {
        T::powi(T::one() - α, 3)
    }

    fn get_step_length(&mut self, step_direction: StepDirection, scaling: ScalingStrategy) -> T {
        let mut α = self.variables.calc_step_length(
            &self.step_lhs,
            &mut self.cones,
            &self.settings,
            step_direction,
        );

        // barrier limits for nonsymmetric cones
        if !self.cones.is_symmetric()
            && step_direction == StepDirection::Combined
            && scaling == ScalingStrategy::Dual
        {
            α = self.backtrack_step_to_barrier(α);
        }
        α
    }

    fn backtrack_step_to_barrier(&mut self, αinit: T) -> T {
        let step = self.settings.linesearch_backtrack_step;
        let mut α = αinit;

        for _ in 0..50 {
            let barrier = self.variables.barrier(&self.step_lhs, α, &mut self.cones);
            if barrier < T::one() {
                return α;
            } else {
                α = step * α;
            }
        }
        α
    }

    fn strategy_checkpoint_insufficient_progress(
        &mut self,
        scaling: ScalingStrategy,
    ) -> StrategyCheckpoint {
        if self.info.status != SolverStatus::InsufficientProgress {
            return StrategyCheckpoint::NoUpdate;
        }

        // insufficient progress often means actual degradation
        self.info
            .reset_to_prev_iterate(&mut self.variables, &self.prev_vars);

        if !self.cones.is_symmetric() && (scaling == ScalingStrategy::PrimalDual) {
            self.info.status = SolverStatus::Unsolved;
            StrategyCheckpoint::Update(ScalingStrategy::Dual)
        } else {
            StrategyCheckpoint::Fail
        }
    }

    fn strategy_checkpoint_numerical_error(
        &mut self,
        is_kkt_solve_success: bool,
        scaling: ScalingStrategy,
    ) -> StrategyCheckpoint {
        if is_kkt_solve_success {
            StrategyCheckpoint::NoUpdate
        } else if !self.cones.is_symmetric() && (scaling == ScalingStrategy::PrimalDual) {
            StrategyCheckpoint::Update(ScalingStrategy::Dual)
        } else {
            self.info.status = SolverStatus::NumericalError;
            StrategyCheckpoint::Fail
        }
    }

    fn strategy_checkpoint_small_step(&mut self, α: T, scaling: ScalingStrategy) -> StrategyCheckpoint {
        if !self.cones.is_symmetric()
            && scaling == ScalingStrategy::PrimalDual
            && α < self.settings.min_switch_step_length
        {
            StrategyCheckpoint::Update(ScalingStrategy::Dual)
        } else if α <= T::max(T::zero(), self.settings.min_terminate_step_length) {
            self.info.status = SolverStatus::InsufficientProgress;
            StrategyCheckpoint::Fail
        } else {
            StrategyCheckpoint::NoUpdate
        }
    }

    fn strategy_checkpoint_is_scaling_success(&mut self, is_scaling_success: bool) -> StrategyCheckpoint {
        if is_scaling_success {
            StrategyCheckpoint::NoUpdate
        } else {
            self.info.status = SolverStatus::NumericalError;
            StrategyCheckpoint::Fail
        }
    }
}

fn check_dimensions<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    b: &[T],
    cone_types: &[SupportedConeT<T>],
) -> Result<(), ConicSolverError> {
    let (m, n) = (A.m, A.n);

    if b.len() != m || q.len() != n || P.m != n || P.n != n {
        return Err(ConicSolverError::IncompatibleDimension);
    }
    if cone_types.iter().map(|c| c.nvars()).sum::<usize>() != m {
        return Err(ConicSolverError::IncompatibleConeDimension);
    }
    for cone in cone_types {
        match cone {
            SupportedConeT::SecondOrderConeT(d) if *d < 2 => {
                return Err(ConicSolverError::BadCone("second order cone of dimension < 2"))
            }
            SupportedConeT::PowerConeT(α) if !(*α > T::zero() && *α < T::one()) => {
                return Err(ConicSolverError::BadCone("power cone exponent outside (0,1)"))
            }
            SupportedConeT::PSDTriangleConeT(0) => {
                return Err(ConicSolverError::BadCone("PSD cone of order 0"))
            }
            _ => {}
        }
    }
    Ok(())
}
