//! Bounded primal simplex.
//!
//! Solves linear problems of the form
//!
//! ```text
//! min  cᵀx
//! s.t. r = Ax,  lc ≤ r ≤ uc,  lx ≤ x ≤ ux
//! ```
//!
//! over the combined variable vector `(x, r)` with the homogeneous
//! equality `[A -I](x, r) = 0`.  The engine starts from the slack basis
//! or a supplied warm start, runs a composite phase 1 that minimizes the
//! sum of bound violations and then optimizes the true costs.

#![allow(non_snake_case)]

use crate::algebra::*;
use derive_builder::Builder;

mod basis;
mod engine;

pub(crate) use basis::*;
pub use engine::*;

/// Entering variable selection rule
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingRule {
    /// most negative reduced cost, switching to Bland's rule on stalls
    #[default]
    Dantzig,
    /// smallest eligible index
    Bland,
}

/// Status of a variable with respect to the basis
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum VarStatus {
    Basic,
    AtLower,
    AtUpper,
    /// nonbasic with equal bounds
    Fixed,
    /// nonbasic free variable at zero
    Free,
}

/// Termination status of the simplex engine
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SimplexStatus {
    Optimal,
    /// phase 1 stopped with positive infeasibility.  The row duals
    /// form a Farkas certificate.
    PrimalInfeasible,
    /// an improving ray without a blocking bound was found
    DualInfeasible,
    MaxIterations,
    MaxTime,
    CallbackTerminated,
    NumericalError,
}

/// Simplex engine settings
#[derive(Builder, Debug, Clone)]
pub struct SimplexSettings<T: FloatT> {
    #[builder(default = "PricingRule::Dantzig")]
    pub pricing: PricingRule,

    /// consecutive degenerate pivots before the Dantzig rule hands over
    /// to Bland's rule
    #[builder(default = "50")]
    pub degen_switch: usize,

    /// basis updates between refactorizations
    #[builder(default = "50")]
    pub refactor_freq: usize,

    #[builder(default = "100_000")]
    pub max_iter: usize,

    /// wall clock limit in seconds
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    /// primal feasibility tolerance
    #[builder(default = "(1e-9).as_T()")]
    pub tol_primal: T,

    /// optimality (reduced cost) tolerance
    #[builder(default = "(1e-9).as_T()")]
    pub tol_dual: T,

    /// smallest acceptable pivot element in the ratio test
    #[builder(default = "(1e-7).as_T()")]
    pub tol_pivot: T,

    #[builder(default = "false")]
    pub verbose: bool,
}

impl<T: FloatT> Default for SimplexSettings<T> {
    fn default() -> Self {
        SimplexSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// A linear problem in the bounded row form accepted by [`PrimalSimplex`].
/// Infinite bounds are given as `±∞`.
#[derive(Debug, Clone)]
pub struct BoundedLp<T> {
    pub A: CscMatrix<T>,
    pub c: Vec<T>,
    pub lc: Vec<T>,
    pub uc: Vec<T>,
    pub lx: Vec<T>,
    pub ux: Vec<T>,
}

impl<T: FloatT> BoundedLp<T> {
    pub fn nvars(&self) -> usize {
        self.A.n
    }

    pub fn ncons(&self) -> usize {
        self.A.m
    }
}

/// Output of a simplex solve
#[derive(Debug, Clone)]
pub struct SimplexSolution<T> {
    pub status: SimplexStatus,
    /// structural values
    pub x: Vec<T>,
    /// row activities `Ax`
    pub r: Vec<T>,
    /// row duals, with `Aᵀy + d = c`
    pub y: Vec<T>,
    /// reduced costs of the structurals
    pub d: Vec<T>,
    /// basis status of structurals `0..n` then logicals `n..n+m`
    pub basis: Vec<VarStatus>,
    /// Farkas row multipliers for `PrimalInfeasible`, or an improving
    /// ray over the structurals for `DualInfeasible`
    pub ray: Option<Vec<T>>,
    pub iterations: usize,
    /// true if the final iterate satisfies the bounds
    pub primal_feasible: bool,
    /// number of basis columns replaced by logicals during repairs
    pub repaired_columns: usize,
    /// number of refactorizations that found drift in the basic values
    pub unstable_updates: usize,
}

impl<T: FloatT> SimplexSolution<T> {
    /// `cᵀx`
    pub fn objective(&self, c: &[T]) -> T {
        c.dot(&self.x)
    }
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
