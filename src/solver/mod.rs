//! Numerical engines.
//!
//! The task layer converts a problem into the form expected by one of
//! the engines here, runs it under the [`EngineState`] machine and maps
//! the result back:
//!
//! * [`conic`]: homogeneous embedding interior point method for
//!   problems over products of cones, with quadratic objectives.
//! * [`simplex`]: bounded primal simplex for linear problems, with
//!   a warm-startable basis.
//! * [`mip`]: branch-and-bound over either of the above.
//! * [`concurrent`]: races copies of a task on a thread pool.

use std::fmt;
use thiserror::Error;

pub mod callbacks;
pub mod concurrent;
pub mod conic;
pub(crate) mod crossover;
pub mod mip;
pub mod simplex;

pub use callbacks::{CallbackCode, Progress, ProgressCallback, ProgressFn};

/// Phase of a single `optimize` call
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum EngineState {
    #[default]
    NotStarted,
    Presolving,
    Iterating,
    BasisIdentification,
    Terminating,
    Done,
}

impl EngineState {
    fn can_advance_to(self, next: EngineState) -> bool {
        use EngineState::*;
        matches!(
            (self, next),
            (NotStarted, Presolving)
                | (Presolving, Iterating)
                | (Presolving, Terminating)
                | (Iterating, BasisIdentification)
                | (Iterating, Terminating)
                | (BasisIdentification, Terminating)
                | (Terminating, Done)
        )
    }
}

/// Tracks and logs the [`EngineState`] of one solve
#[derive(Debug)]
pub(crate) struct EngineStateMachine {
    state: EngineState,
    label: &'static str,
}

impl EngineStateMachine {
    pub fn new(label: &'static str) -> Self {
        Self {
            state: EngineState::NotStarted,
            label,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn advance(&mut self, next: EngineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid engine transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("{}: {:?} -> {:?}", self.label, self.state, next);
        self.state = next;
    }

    /// Move through the remaining states to `Done`
    pub fn finish(&mut self) {
        if self.state != EngineState::Terminating && self.state != EngineState::Done {
            self.advance(EngineState::Terminating);
        }
        if self.state != EngineState::Done {
            self.advance(EngineState::Done);
        }
    }
}

/// Reason an `optimize` call stopped
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationCode {
    /// the engine ran to its natural end
    #[default]
    Ok,
    MaxIterations,
    MaxTime,
    /// the progress callback asked for termination
    UserCallback,
    MioMaxNodes,
    NumericalProblem,
    /// no further progress could be made
    Stall,
}

impl fmt::Display for TerminationCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Recoverable numerical events recorded during a solve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericalWarning {
    #[error("singular basis repaired by {replaced} logical column(s)")]
    BasisRepaired { replaced: usize },
    #[error("KKT factorization retried with increased regularization ({retries} time(s))")]
    FactorizationRetry { retries: usize },
    #[error("interior point terminated at reduced accuracy")]
    ReducedAccuracy,
    #[error("basis refactorized after an unstable update")]
    UnstableUpdate,
    #[error("presolve postsolve residual {residual:e} above tolerance")]
    PostsolveResidual { residual: f64 },
}

/// Push `warning` onto `list` and report it through the log facade
pub(crate) fn record_warning(list: &mut Vec<NumericalWarning>, warning: NumericalWarning) {
    log::warn!("{}", warning);
    list.push(warning);
}

#[test]
fn test_engine_state_machine() {
    let mut sm = EngineStateMachine::new("test");
    assert_eq!(sm.state(), EngineState::NotStarted);
    sm.advance(EngineState::Presolving);
    sm.advance(EngineState::Iterating);
    sm.finish();
    assert_eq!(sm.state(), EngineState::Done);

    assert!(EngineState::Iterating.can_advance_to(EngineState::BasisIdentification));
    assert!(!EngineState::NotStarted.can_advance_to(EngineState::Done));
    assert!(!EngineState::Done.can_advance_to(EngineState::Iterating));
}
