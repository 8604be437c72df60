//! Races copies of a task on a thread pool.
//!
//! Each copy is solved with different parameters.  A shared cancel flag
//! is observed by the progress callback of every copy, so that the
//! remaining copies stop at their next iteration boundary once one copy
//! has finished with a certified status.

use super::callbacks::{CallbackCode, Progress, SolverCallbacks};
use super::TerminationCode;
use crate::io::ConfigurablePrintTarget;
use crate::task::*;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const NO_WINNER: usize = usize::MAX;

/// Outcome of a concurrent solve
pub struct ConcurrentResult<'env> {
    /// index of the copy whose results were adopted, if any
    pub winner: Option<usize>,
    /// the solved copies, in the order of the settings they were given
    pub tasks: Vec<Task<'env>>,
    /// result of `optimize` for each copy
    pub codes: Vec<Result<TerminationCode, OptimizeError>>,
}

/// Solve copies of `task` with each of `optimizers` concurrently.
///
/// The first copy to finish with an optimal solution or a certificate
/// wins and its results are copied into `task`.  All copies are joined
/// before returning.  The progress callback of `task` only sees the
/// begin and end of the race.
pub fn optimize_concurrent<'env>(
    task: &mut Task<'env>,
    optimizers: &[OptimizerType],
) -> ConcurrentResult<'env> {
    notify(task, CallbackCode::BeginConcurrent);
    let mut result = race(task, optimizers.len(), |copy, k| {
        copy.params.optimizer = optimizers[k];
    });
    if let Some(k) = result.winner {
        log::info!("concurrent: {:?} finished first", optimizers[k]);
        adopt(task, &mut result.tasks[k]);
    }
    notify(task, CallbackCode::EndConcurrent);
    result
}

/// Solve copies of the integer problem `task` with different branching
/// seeds concurrently.
///
/// The copy with the best integer objective wins; among equal
/// objectives an integer optimal copy is preferred.
pub fn optimize_concurrent_mio<'env>(task: &mut Task<'env>, seeds: &[i32]) -> ConcurrentResult<'env> {
    notify(task, CallbackCode::BeginConcurrent);
    let mut result = race(task, seeds.len(), |copy, k| {
        copy.params.mio_seed = seeds[k];
    });

    let sense = task.get_obj_sense();
    let mut best: Option<(usize, f64, bool)> = None;
    for (k, copy) in result.tasks.iter().enumerate() {
        let Ok(sol) = copy.get_solution(SolutionType::Integer) else {
            continue;
        };
        let optimal = sol.solsta == SolutionStatus::IntegerOptimal;
        if !optimal && sol.solsta != SolutionStatus::PrimalFeasible {
            continue;
        }
        // compare as a minimization
        let obj = if sense == ObjSense::Maximize { -sol.pobj } else { sol.pobj };
        let better = match best {
            None => true,
            Some((_, best_obj, best_optimal)) => obj < best_obj || (obj == best_obj && optimal && !best_optimal),
        };
        if better {
            best = Some((k, obj, optimal));
        }
    }

    result.winner = best.map(|(k, _, _)| k);
    if let Some(k) = result.winner {
        log::info!("concurrent: seed {} gave the best integer solution", seeds[k]);
        adopt(task, &mut result.tasks[k]);
    }
    notify(task, CallbackCode::EndConcurrent);
    result
}

fn notify(task: &mut Task, code: CallbackCode) {
    let mut callback = task.take_callback();
    SolverCallbacks::new(callback.as_deref_mut()).notify(Progress::new(code));
    task.restore_callback(callback);
}

/// Solve `count` copies of `task`, each adjusted by `configure`
fn race<'env, F>(task: &Task<'env>, count: usize, configure: F) -> ConcurrentResult<'env>
where
    F: Fn(&mut Task<'env>, usize),
{
    let cancel = Arc::new(AtomicBool::new(false));
    let first = AtomicUsize::new(NO_WINNER);

    let mut tasks: Vec<Task<'env>> = (0..count)
        .map(|k| {
            let mut copy = task.duplicate();
            configure(&mut copy, k);
            copy.print_to_buffer();
            let cancel = Arc::clone(&cancel);
            copy.set_progress_callback(move |_| cancel.load(Ordering::Relaxed) as i32);
            copy
        })
        .collect();

    let solve_all = |tasks: &mut Vec<Task<'env>>| -> Vec<Result<TerminationCode, OptimizeError>> {
        tasks
            .par_iter_mut()
            .enumerate()
            .map(|(k, copy)| {
                let code = copy.optimize();
                if code.is_ok()
                    && is_certified(copy)
                    && first
                        .compare_exchange(NO_WINNER, k, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    cancel.store(true, Ordering::Relaxed);
                }
                code
            })
            .collect()
    };

    let threads = count.min(task.env().num_threads()).max(1);
    let codes = match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| solve_all(&mut tasks)),
        Err(e) => {
            log::warn!("concurrent: no thread pool ({}), using the global one", e);
            solve_all(&mut tasks)
        }
    };

    for copy in tasks.iter_mut() {
        copy.unset_progress_callback();
    }

    let winner = first.into_inner();
    ConcurrentResult {
        winner: (winner != NO_WINNER).then_some(winner),
        tasks,
        codes,
    }
}

/// true if the last solve ended with an optimal solution or a certificate
fn is_certified(task: &Task) -> bool {
    if task.termination_code() != Some(TerminationCode::Ok) {
        return false;
    }
    [SolutionType::Integer, SolutionType::Basic, SolutionType::Interior]
        .into_iter()
        .filter_map(|whichsol| task.get_solution(whichsol).ok())
        .any(|sol| {
            matches!(
                sol.solsta,
                SolutionStatus::Optimal
                    | SolutionStatus::IntegerOptimal
                    | SolutionStatus::PrimalInfeasibleCertificate
                    | SolutionStatus::DualInfeasibleCertificate
            )
        })
}

/// Copy the results and the log of `winner` into `task`
fn adopt(task: &mut Task, winner: &mut Task) {
    task.adopt_results(winner);
    if let Ok(log) = winner.get_print_buffer() {
        let _ = task.print_target().write_all(log.as_bytes());
    }
}
