//! Progress reporting and cooperative termination.
//!
//! Engines report to an optional user closure at fixed checkpoints.
//! A nonzero return value from the closure asks the running engine to
//! stop at the next iteration boundary.

use crate::timers::Instant;

/// Checkpoint at which the progress callback is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallbackCode {
    BeginOptimizer,
    EndOptimizer,
    BeginPresolve,
    EndPresolve,
    BeginIntpnt,
    IntpntIter,
    EndIntpnt,
    BeginPrimalSimplex,
    UpdatePrimalSimplex,
    EndPrimalSimplex,
    BeginBasisIdentify,
    EndBasisIdentify,
    BeginMio,
    UpdateMio,
    NewIntSolution,
    EndMio,
    BeginPrimalRepair,
    EndPrimalRepair,
    BeginConcurrent,
    EndConcurrent,
}

/// Telemetry passed to the progress callback
#[derive(Debug, Clone)]
pub struct Progress {
    pub code: CallbackCode,
    /// iterations of the running engine
    pub iterations: u32,
    pub primal_obj: f64,
    pub dual_obj: f64,
    /// seconds since the start of the solve
    pub elapsed: f64,
    /// barrier parameter (interior point only)
    pub mu: f64,
    pub mio_num_nodes: u32,
    pub mio_obj_bound: f64,
}

impl Progress {
    pub fn new(code: CallbackCode) -> Self {
        Self {
            code,
            iterations: 0,
            primal_obj: f64::NAN,
            dual_obj: f64::NAN,
            elapsed: 0.0,
            mu: f64::NAN,
            mio_num_nodes: 0,
            mio_obj_bound: f64::NAN,
        }
    }
}

/// Signature of the user progress callback.  Return 0 to continue.
pub type ProgressFn = dyn FnMut(&Progress) -> i32 + Send;

/// Boxed progress callback as stored on a task
pub type ProgressCallback = Box<ProgressFn>;

/// Callback plumbing handed to the engines for one solve
pub(crate) struct SolverCallbacks<'a> {
    progress: Option<&'a mut ProgressFn>,
    start: Instant,
    terminated: bool,
}

impl<'a> SolverCallbacks<'a> {
    pub fn new(progress: Option<&'a mut ProgressFn>) -> Self {
        Self {
            progress,
            start: Instant::now(),
            terminated: false,
        }
    }

    pub fn none() -> Self {
        Self::new(None)
    }

    /// Report `progress`.  Returns true when termination was requested,
    /// now or at an earlier checkpoint.
    pub fn notify(&mut self, mut progress: Progress) -> bool {
        progress.elapsed = self.elapsed();
        if let Some(f) = self.progress.as_mut() {
            if f(&progress) != 0 {
                if !self.terminated {
                    log::debug!("termination requested by callback at {:?}", progress.code);
                }
                self.terminated = true;
            }
        }
        self.terminated
    }

    /// true once the callback has asked for termination
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// seconds since these callbacks were created
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[test]
fn test_callback_termination_latches() {
    let mut calls = 0;
    let mut f = move |p: &Progress| -> i32 {
        calls += 1;
        (p.iterations >= 2 && calls > 0) as i32
    };
    let mut cb = SolverCallbacks::new(Some(&mut f));
    let mut p = Progress::new(CallbackCode::IntpntIter);
    assert!(!cb.notify(p.clone()));
    p.iterations = 2;
    assert!(cb.notify(p.clone()));
    p.iterations = 0;
    assert!(cb.notify(p));
    assert!(cb.is_terminated());

    let mut cb = SolverCallbacks::none();
    assert!(!cb.notify(Progress::new(CallbackCode::BeginMio)));
}
