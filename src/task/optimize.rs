//! The `optimize` entry point: engine selection, presolve, the engine
//! runs and postsolve.

#![allow(non_snake_case)]

use super::conic_form::ConicForm;
use super::polish::polish_active_set;
use super::problem::ProblemData;
use super::solution::{basic_solution, Solution};
use super::*;
use crate::presolve::scaling::LpScaling;
use crate::presolve::{presolve, PresolveOutcome, Postsolve};
use crate::solver::callbacks::{CallbackCode, Progress, SolverCallbacks};
use crate::solver::conic::{ConicSolver, SolverStatus};
use crate::solver::crossover::crossover;
use crate::solver::mip::*;
use crate::solver::simplex::{solve_lp, SimplexSolution, SimplexStatus, VarStatus};
use crate::solver::{record_warning, EngineState, EngineStateMachine};
use crate::timers::*;
use std::io::{sink, Write};

/// Engine that solves a problem or its relaxations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Simplex,
    Intpnt,
    Mip,
}

/// Counters and timers collected over one `optimize`
#[derive(Default)]
struct SolveStats {
    info: InfoItems,
    warnings: Vec<NumericalWarning>,
    timers: Timers,
}

/// Solutions of one continuous solve
struct Continuous {
    interior: Option<Solution>,
    basic: Option<Solution>,
    termination: TerminationCode,
}

impl Continuous {
    fn primary(&self) -> Option<&Solution> {
        self.basic.as_ref().or(self.interior.as_ref())
    }
}

/// Options of one continuous solve
struct ContinuousOptions<'a> {
    engine: Engine,
    warm: Option<&'a [VarStatus]>,
    // run crossover after an optimal interior point solve of an LP
    crossover: bool,
    time_limit: f64,
}

impl<'env> Task<'env> {
    /// Solve the problem.
    ///
    /// Returns the termination code of the solve.  Solutions, status
    /// keys and information items are available through the getters
    /// afterwards.  Errors are returned for problems that cannot be
    /// solved at all; in that case no solution is defined.
    pub fn optimize(&mut self) -> Result<TerminationCode, OptimizeError> {
        let mut callback = self.take_callback();
        let mut print = self.take_print();

        let result = {
            let mut callbacks = SolverCallbacks::new(callback.as_deref_mut());
            self.optimize_with(&mut print, &mut callbacks)
        };

        self.restore_callback(callback);
        self.restore_print(print);
        if let Err(e) = &result {
            log::debug!("optimize failed: {}", e);
        }
        result
    }

    pub(crate) fn optimize_with(
        &mut self,
        print: &mut PrintTarget,
        callbacks: &mut SolverCallbacks,
    ) -> Result<TerminationCode, OptimizeError> {
        self.clear_results();
        self.info.clear();
        self.warnings.clear();
        self.basis_solve = None;

        let problem = self.data.to_problem(self.env)?;
        let engine = self.select_engine(&problem)?;
        let params = self.params.clone();

        let mut silent = sink();
        let out: &mut dyn Write = if params.log_level > 0 { print } else { &mut silent };
        let _ = writeln!(
            out,
            "conicopt v{}: {} variables, {} constraints, {} cones, {} nonzeros",
            crate::VERSION,
            problem.numvar(),
            problem.numcon(),
            problem.cones.len(),
            problem.A.nnz()
        );
        let _ = writeln!(out, "optimizer: {:?}", engine);

        let mut stats = SolveStats::default();
        let mut sm = EngineStateMachine::new("optimize");
        callbacks.notify(Progress::new(CallbackCode::BeginOptimizer));

        let mut basic = None;
        let mut interior = None;
        let mut integer = None;
        let termination;

        timeit! {stats.timers => "optimizer"; {
        match engine {
            Engine::Mip => {
                sm.advance(EngineState::Presolving);
                sm.advance(EngineState::Iterating);
                let initial = self.initial_integer_values(&problem);
                let (sol, code) = solve_mip(&problem, &params, initial.as_deref(), out, callbacks, &mut stats)?;
                integer = sol;
                termination = code;
            }
            _ => {
                let warm = if engine == Engine::Simplex { self.warm_basis() } else { None };
                let opts = ContinuousOptions {
                    engine,
                    warm: warm.as_deref(),
                    crossover: params.intpnt_basis,
                    time_limit: params.optimizer_max_time,
                };
                let result = solve_continuous(&problem, &params, &opts, out, callbacks, &mut stats, Some(&mut sm))?;
                basic = result.basic;
                interior = result.interior;
                termination = result.termination;
            }
        }
        }}
        sm.finish();
        callbacks.notify(Progress::new(CallbackCode::EndOptimizer));

        // back to the sense of the task
        let sense = self.data.sense;
        for sol in [&mut basic, &mut interior, &mut integer].into_iter().flatten() {
            sol.apply_sense(sense);
        }
        if sense == ObjSense::Maximize {
            for item in [
                DouInfItem::MioObjBound,
                DouInfItem::MioConstructSolutionObj,
            ] {
                let v = stats.info.double(item);
                if !v.is_nan() {
                    stats.info.set_double(item, -v);
                }
            }
        }

        let warm = basic.as_ref().and_then(|s| s.var_statuses());
        if warm.is_some() {
            self.set_warm_basis(warm);
        }

        let t = &stats.timers;
        let section = |key: &str| t.seconds(&["optimizer", key]) + t.seconds(&["optimizer", "mio", key]);
        stats.info.set_double(DouInfItem::OptimizerTime, t.seconds(&["optimizer"]));
        stats.info.set_double(DouInfItem::PresolveTime, section("presolve"));
        stats.info.set_double(DouInfItem::SimTime, section("simplex") + section("crossover"));
        stats.info.set_double(DouInfItem::IntpntTime, section("intpnt"));
        stats.info.set_double(DouInfItem::MioTime, t.seconds(&["optimizer", "mio"]));
        if params.log_level > 1 {
            let _ = t.print(out);
        }

        for sol in [&basic, &interior, &integer].into_iter().flatten() {
            let _ = writeln!(
                out,
                "solution status {:?}, problem status {:?}, primal {:.8e}, dual {:.8e}",
                sol.solsta, sol.prosta, sol.pobj, sol.dobj
            );
        }
        let _ = writeln!(out, "termination: {}", termination);
        log::info!(
            "optimize finished with {} in {:.3}s",
            termination,
            t.seconds(&["optimizer"])
        );

        self.set_solution(SolutionType::Basic, basic);
        self.set_solution(SolutionType::Interior, interior);
        self.set_solution(SolutionType::Integer, integer);
        self.info = stats.info;
        self.warnings = stats.warnings;
        self.termination = Some(termination);
        Ok(termination)
    }

    fn select_engine(&self, problem: &ProblemData) -> Result<Engine, OptimizeError> {
        if problem.has_integers() && problem.has_psd() {
            return Err(OptimizeError::NoApplicableOptimizer(
                "integer variables together with semidefinite cones",
            ));
        }
        let engine = match self.params.optimizer {
            _ if problem.has_integers() => Engine::Mip,
            OptimizerType::MixedInt => Engine::Mip,
            OptimizerType::Free if problem.is_linear() => Engine::Simplex,
            OptimizerType::Free | OptimizerType::Intpnt | OptimizerType::Conic => Engine::Intpnt,
            OptimizerType::PrimalSimplex if problem.is_linear() => Engine::Simplex,
            OptimizerType::PrimalSimplex => {
                return Err(OptimizeError::NoApplicableOptimizer(
                    "the primal simplex needs a linear problem",
                ))
            }
        };
        Ok(engine)
    }

    /// Initial values of all integer variables, if every one was given
    fn initial_integer_values(&self, problem: &ProblemData) -> Option<Vec<f64>> {
        let init = &self.data.xx_init;
        let mut x = vec![0.0; problem.numvar()];
        for j in 0..problem.numvar() {
            if problem.integer[j] {
                x[j] = init.get(j).copied().flatten()?;
            }
        }
        Some(x)
    }
}

/// Run presolve, the engine and postsolve on a continuous problem
#[allow(clippy::too_many_arguments)]
fn solve_continuous(
    problem: &ProblemData,
    params: &Parameters,
    opts: &ContinuousOptions,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
    mut sm: Option<&mut EngineStateMachine>,
) -> Result<Continuous, OptimizeError> {
    if let Some(sm) = sm.as_deref_mut() {
        sm.advance(EngineState::Presolving);
    }

    let mut reduced_holder = None;
    let mut postsolve = None;
    if params.presolve {
        callbacks.notify(Progress::new(CallbackCode::BeginPresolve));
        let outcome;
        timeit! {stats.timers => "presolve"; {
            outcome = presolve(problem);
        }}
        callbacks.notify(Progress::new(CallbackCode::EndPresolve));

        match outcome {
            PresolveOutcome::Certified(cert) => {
                let _ = writeln!(out, "presolve: problem status {:?}", cert.prosta);
                if let Some(sm) = sm.as_deref_mut() {
                    sm.advance(EngineState::Terminating);
                }
                let (basic, interior) = match opts.engine {
                    Engine::Simplex => (Some(cert), None),
                    _ => (None, Some(cert)),
                };
                return Ok(Continuous {
                    interior,
                    basic,
                    termination: TerminationCode::Ok,
                });
            }
            PresolveOutcome::Reduced(reduced, post) => {
                if sm.is_some() {
                    stats.info.set_int(IntInfItem::PresolveNumRemovedVars, post.removed_vars as i64);
                    stats.info.set_int(IntInfItem::PresolveNumRemovedCons, post.removed_cons as i64);
                }
                reduced_holder = Some(*reduced);
                postsolve = Some(post);
            }
        }
    }
    let reduced = reduced_holder.as_ref().unwrap_or(problem);

    if let Some(sm) = sm.as_deref_mut() {
        sm.advance(EngineState::Iterating);
    }

    let warm = match (&postsolve, opts.warm) {
        (Some(post), Some(w)) if w.len() == problem.numvar() + problem.numcon() => {
            Some(post.reduce_statuses(w, problem.numvar()))
        }
        (None, Some(w)) => Some(w.to_vec()),
        _ => None,
    };

    let mut result = if reduced.numvar() == 0 && reduced.numcon() == 0 {
        trivial_solution(reduced, opts.engine)
    } else {
        match opts.engine {
            Engine::Simplex => run_simplex(reduced, params, warm.as_deref(), opts.time_limit, out, callbacks, stats)?,
            _ => {
                let mut result = run_intpnt(reduced, params, opts.time_limit, out, callbacks, stats)?;
                let optimal = result
                    .interior
                    .as_ref()
                    .map_or(false, |s| s.solsta == SolutionStatus::Optimal);
                if optimal && !reduced.is_linear() {
                    polish_interior(reduced, params, &mut result.interior);
                }
                if opts.crossover && optimal && reduced.is_linear() {
                    if let Some(sm) = sm.as_deref_mut() {
                        sm.advance(EngineState::BasisIdentification);
                    }
                    let x = result.interior.as_ref().map(|s| s.xx.clone()).unwrap_or_default();
                    result.basic = run_crossover(reduced, params, &x, opts.time_limit, out, callbacks, stats)?;
                }
                result
            }
        }
    };

    if let Some(sm) = sm.as_deref_mut() {
        sm.advance(EngineState::Terminating);
    }

    if let Some(post) = &postsolve {
        restore(post, problem, &mut result.basic);
        restore(post, problem, &mut result.interior);
        check_postsolve(problem, params, &result, stats);
    }
    Ok(result)
}

// restored optimal points are measured against the full problem
fn check_postsolve(problem: &ProblemData, params: &Parameters, result: &Continuous, stats: &mut SolveStats) {
    let scale = [&problem.lc, &problem.uc, &problem.lx, &problem.ux]
        .into_iter()
        .flatten()
        .filter(|b| b.is_finite())
        .fold(1.0, |acc: f64, b| acc.max(b.abs()));
    let tol = 100.0 * scale * f64::max(params.simplex_tol_primal, params.intpnt_tol_pfeas);
    let residual = [&result.basic, &result.interior]
        .into_iter()
        .flatten()
        .filter(|s| s.solsta == SolutionStatus::Optimal)
        .map(|s| {
            let info = problem.solution_info(s);
            f64::max(info.max_pbound_viol, info.max_pcon_viol)
        })
        .fold(0.0, f64::max);
    if residual > tol {
        record_warning(&mut stats.warnings, NumericalWarning::PostsolveResidual { residual });
    }
}

fn restore(post: &Postsolve, problem: &ProblemData, sol: &mut Option<Solution>) {
    if let Some(s) = sol.as_mut() {
        *s = post.restore(problem, s);
    }
}

/// Solution of a problem left without variables and constraints
fn trivial_solution(problem: &ProblemData, engine: Engine) -> Continuous {
    let mut sol = Solution::new(0, 0);
    sol.solsta = SolutionStatus::Optimal;
    sol.prosta = ProblemStatus::PrimalAndDualFeasible;
    sol.pobj = problem.cfix;
    sol.dobj = problem.cfix;
    let (basic, interior) = match engine {
        Engine::Simplex => (Some(sol), None),
        _ => (Some(sol.clone()), Some(sol)),
    };
    Continuous {
        interior,
        basic,
        termination: TerminationCode::Ok,
    }
}

fn simplex_termination(status: SimplexStatus) -> TerminationCode {
    match status {
        SimplexStatus::Optimal | SimplexStatus::PrimalInfeasible | SimplexStatus::DualInfeasible => {
            TerminationCode::Ok
        }
        SimplexStatus::MaxIterations => TerminationCode::MaxIterations,
        SimplexStatus::MaxTime => TerminationCode::MaxTime,
        SimplexStatus::CallbackTerminated => TerminationCode::UserCallback,
        SimplexStatus::NumericalError => TerminationCode::NumericalProblem,
    }
}

fn record_simplex_warnings(sx: &SimplexSolution<f64>, stats: &mut SolveStats) {
    if sx.repaired_columns > 0 {
        record_warning(
            &mut stats.warnings,
            NumericalWarning::BasisRepaired {
                replaced: sx.repaired_columns,
            },
        );
    }
    if sx.unstable_updates > 0 {
        record_warning(&mut stats.warnings, NumericalWarning::UnstableUpdate);
    }
}

fn remaining(time_limit: f64, callbacks: &SolverCallbacks) -> f64 {
    if time_limit > 0.0 {
        (time_limit - callbacks.elapsed()).max(1e-9)
    } else {
        f64::INFINITY
    }
}

fn run_simplex(
    problem: &ProblemData,
    params: &Parameters,
    warm: Option<&[VarStatus]>,
    time_limit: f64,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
) -> Result<Continuous, OptimizeError> {
    let settings = params.simplex_settings(remaining(time_limit, callbacks));
    let lp = problem.lp();

    let sx;
    timeit! {stats.timers => "simplex"; {
        let scaling = params.simplex_scaling.then(|| LpScaling::new(&lp)).filter(|s| !s.is_identity());
        sx = match &scaling {
            Some(scaling) => {
                let scaled = scaling.scale(&lp);
                let mut sx = solve_lp(&scaled, &settings, warm, out, callbacks)?;
                scaling.unscale(&mut sx);
                sx
            }
            None => solve_lp(&lp, &settings, warm, out, callbacks)?,
        };
    }}

    stats.info.add_int(IntInfItem::SimPrimalIter, sx.iterations as i64);
    record_simplex_warnings(&sx, stats);

    Ok(Continuous {
        interior: None,
        basic: Some(basic_solution(problem, &sx)),
        termination: simplex_termination(sx.status),
    })
}

fn run_intpnt(
    problem: &ProblemData,
    params: &Parameters,
    time_limit: f64,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
) -> Result<Continuous, OptimizeError> {
    let settings = params.conic_settings(remaining(time_limit, callbacks));

    let sol;
    let status;
    timeit! {stats.timers => "intpnt"; {
        let form = ConicForm::new(problem);
        let mut solver = ConicSolver::new(&form.P, &form.q, &form.A, &form.b, &form.cones, settings)?;
        solver.solve(out, callbacks);

        status = solver.solution.status;
        stats.info.add_int(IntInfItem::IntpntIter, solver.solution.iterations as i64);
        let retries = solver.factorization_retries();
        if retries > 0 {
            record_warning(&mut stats.warnings, NumericalWarning::FactorizationRetry { retries });
        }
        sol = form.recover(problem, &solver.solution);
    }}

    if matches!(
        status,
        SolverStatus::AlmostSolved
            | SolverStatus::AlmostPrimalInfeasible
            | SolverStatus::AlmostDualInfeasible
    ) {
        record_warning(&mut stats.warnings, NumericalWarning::ReducedAccuracy);
    }

    let termination = match status {
        SolverStatus::Solved
        | SolverStatus::AlmostSolved
        | SolverStatus::PrimalInfeasible
        | SolverStatus::AlmostPrimalInfeasible
        | SolverStatus::DualInfeasible
        | SolverStatus::AlmostDualInfeasible => TerminationCode::Ok,
        SolverStatus::MaxIterations => TerminationCode::MaxIterations,
        SolverStatus::MaxTime => TerminationCode::MaxTime,
        SolverStatus::CallbackTerminated => TerminationCode::UserCallback,
        SolverStatus::InsufficientProgress => TerminationCode::Stall,
        SolverStatus::NumericalError | SolverStatus::Unsolved => TerminationCode::NumericalProblem,
    };

    Ok(Continuous {
        interior: Some(sol),
        basic: None,
        termination,
    })
}

// quadratic optima at degenerate bounds are resolved exactly where possible
fn polish_interior(problem: &ProblemData, params: &Parameters, interior: &mut Option<Solution>) {
    let Some(sol) = interior.as_mut() else {
        return;
    };
    let tol = f64::min(params.intpnt_tol_pfeas, params.intpnt_tol_dfeas);
    if let Some(polished) = polish_active_set(problem, sol, tol) {
        log::debug!("polished interior solution, objective {:e}", polished.pobj);
        *sol = polished;
    }
}

#[allow(clippy::too_many_arguments)]
fn run_crossover(
    problem: &ProblemData,
    params: &Parameters,
    x: &[f64],
    time_limit: f64,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
) -> Result<Option<Solution>, OptimizeError> {
    let settings = params.simplex_settings(remaining(time_limit, callbacks));
    let lp = problem.lp();

    callbacks.notify(Progress::new(CallbackCode::BeginBasisIdentify));
    let sx;
    timeit! {stats.timers => "crossover"; {
        sx = crossover(&lp, &settings, x, out, callbacks)?;
    }}
    callbacks.notify(Progress::new(CallbackCode::EndBasisIdentify));

    stats.info.add_int(IntInfItem::SimPrimalIter, sx.iterations as i64);
    record_simplex_warnings(&sx, stats);

    // a crossover cut short leaves only the interior solution
    Ok((sx.status == SimplexStatus::Optimal).then(|| basic_solution(problem, &sx)))
}

/// Branch-and-bound with relaxations solved by the simplex for linear
/// problems and by the interior point method otherwise
fn solve_mip(
    problem: &ProblemData,
    params: &Parameters,
    initial: Option<&[f64]>,
    out: &mut dyn Write,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
) -> Result<(Option<Solution>, TerminationCode), OptimizeError> {
    let engine = if problem.is_linear() { Engine::Simplex } else { Engine::Intpnt };
    let settings = MipSettings {
        node_order: match params.mio_node_selection {
            NodeSelection::BestBound => NodeOrder::BestBound,
            NodeSelection::DepthFirst => NodeOrder::DepthFirst,
        },
        max_nodes: (params.mio_max_nodes >= 0).then_some(params.mio_max_nodes as usize),
        max_time: limit_or_infinity(params.mio_max_time).min(limit_or_infinity(params.optimizer_max_time)),
        tol_int: params.mio_tol_abs_relax_int,
        tol_rel_gap: params.mio_tol_rel_gap,
        tol_abs_gap: params.mio_tol_abs_gap,
        construct_sol: params.mio_construct_sol,
        seed: params.mio_seed.max(0) as u64,
    };
    let _ = writeln!(out, "branch-and-bound with {:?} relaxations", engine);

    callbacks.notify(Progress::new(CallbackCode::BeginMio));
    let result;
    timeit! {stats.timers => "mio"; {
        result = branch_and_bound(
            &problem.integer,
            &problem.lx,
            &problem.ux,
            initial,
            &settings,
            callbacks,
            |lx: &[f64], ux: &[f64], warm: Option<&[VarStatus]>, cb: &mut SolverCallbacks| {
                let mut node = problem.clone();
                node.lx.copy_from_slice(lx);
                node.ux.copy_from_slice(ux);
                let opts = ContinuousOptions {
                    engine,
                    warm,
                    crossover: false,
                    time_limit: settings.max_time,
                };
                let solved = solve_continuous(&node, params, &opts, &mut sink(), cb, stats, None)?;
                Ok::<_, OptimizeError>(relaxation(&solved))
            },
        )?;
    }}

    let mut progress = Progress::new(CallbackCode::EndMio);
    progress.mio_num_nodes = result.nodes as u32;
    progress.mio_obj_bound = result.bound;
    callbacks.notify(progress);

    let info = &mut stats.info;
    info.set_int(IntInfItem::MioNumNodes, result.nodes as i64);
    info.set_int(IntInfItem::MioNumIntSolutions, result.num_int_solutions as i64);
    info.set_int(IntInfItem::MioConstructSolution, result.construct_obj.is_some() as i64);
    if let Some(obj) = result.construct_obj {
        info.set_double(DouInfItem::MioConstructSolutionObj, obj);
    }
    info.set_double(DouInfItem::MioObjBound, result.bound);
    info.set_double(DouInfItem::MioObjAbsGap, result.abs_gap());
    info.set_double(DouInfItem::MioObjRelGap, result.rel_gap());

    let sol = match result.status {
        MipStatus::Optimal | MipStatus::Feasible => result.incumbent.as_ref().map(|(x, obj)| {
            let mut sol = Solution::new(problem.numvar(), problem.numcon());
            sol.xx.copy_from_slice(x);
            sol.xc = problem.activities(x);
            sol.pobj = *obj;
            sol.dobj = result.bound;
            (sol.solsta, sol.prosta) = if result.status == MipStatus::Optimal {
                (SolutionStatus::IntegerOptimal, ProblemStatus::PrimalAndDualFeasible)
            } else {
                (SolutionStatus::PrimalFeasible, ProblemStatus::Unknown)
            };
            sol
        }),
        MipStatus::Infeasible | MipStatus::Unbounded => {
            Some(root_certificate(problem, params, &result, engine, callbacks, stats)?)
        }
        MipStatus::Unknown => Some(Solution::new(problem.numvar(), problem.numcon())),
    };

    let _ = writeln!(
        out,
        "branch-and-bound: {:?} after {} nodes, best bound {:.8e}",
        result.status, result.nodes, result.bound
    );
    Ok((sol, result.termination))
}

fn limit_or_infinity(t: f64) -> f64 {
    if t > 0.0 {
        t
    } else {
        f64::INFINITY
    }
}

fn relaxation(solved: &Continuous) -> Relaxation {
    if solved.termination != TerminationCode::Ok {
        return Relaxation::with_status(RelaxationStatus::Stopped(solved.termination));
    }
    let Some(sol) = solved.primary() else {
        return Relaxation::with_status(RelaxationStatus::Failed);
    };
    match sol.solsta {
        SolutionStatus::Optimal => Relaxation {
            status: RelaxationStatus::Optimal,
            x: sol.xx.clone(),
            obj: sol.pobj,
            basis: sol.var_statuses(),
        },
        SolutionStatus::PrimalInfeasibleCertificate => Relaxation::with_status(RelaxationStatus::Infeasible),
        SolutionStatus::DualInfeasibleCertificate => Relaxation::with_status(RelaxationStatus::Unbounded),
        _ => Relaxation::with_status(RelaxationStatus::Failed),
    }
}

/// Integer solution of a tree exhausted without incumbent or with an
/// unbounded relaxation.  The root relaxation supplies the certificate
/// when it is itself infeasible or unbounded.
fn root_certificate(
    problem: &ProblemData,
    params: &Parameters,
    result: &MipResult,
    engine: Engine,
    callbacks: &mut SolverCallbacks,
    stats: &mut SolveStats,
) -> Result<Solution, OptimizeError> {
    let certified_root = matches!(
        result.root_status,
        Some(RelaxationStatus::Infeasible) | Some(RelaxationStatus::Unbounded)
    );
    if certified_root {
        let opts = ContinuousOptions {
            engine,
            warm: None,
            crossover: false,
            time_limit: limit_or_infinity(params.optimizer_max_time),
        };
        let solved = solve_continuous(problem, params, &opts, &mut sink(), callbacks, stats, None)?;
        if let Some(sol) = solved.primary().filter(|s| s.is_certificate()) {
            return Ok(sol.clone());
        }
    }

    // a tree exhausted without incumbent carries the status only
    let mut sol = Solution::new(problem.numvar(), problem.numcon());
    (sol.solsta, sol.prosta) = match result.status {
        MipStatus::Unbounded => (SolutionStatus::DualInfeasibleCertificate, ProblemStatus::DualInfeasible),
        _ => (SolutionStatus::PrimalInfeasibleCertificate, ProblemStatus::PrimalInfeasible),
    };
    Ok(sol)
}
