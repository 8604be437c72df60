//! The task: problem builder, solve entry point and solution queries.
//!
//! A [`Task`] borrows an [`Env`] and holds one optimization problem
//!
//! ```text
//! min/max  ½xᵀQx + cᵀx + cfix
//! s.t.     lc ≤ Ax ≤ uc
//!          lx ≤ x ≤ ux
//!          x ∈ K,  x_j integer for j in J
//! ```
//!
//! with `K` a product of cones over subsets of the variables.  The
//! problem is built incrementally, solved with [`Task::optimize`] and
//! queried per [`SolutionType`].

use crate::env::Env;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::callbacks::{Progress, ProgressCallback};
use crate::solver::simplex::VarStatus;
use crate::solver::{NumericalWarning, TerminationCode};
use std::fs::File;
use std::io::Write;

mod conic_form;
mod data;
mod errors;
mod info;
#[cfg(feature = "serde")]
mod json;
mod optimize;
mod params;
mod polish;
pub(crate) mod problem;
mod repair;
mod sensitivity;
mod solution;
mod summary;
mod types;

pub(crate) use data::TaskData;
pub use errors::*;
pub use info::{DouInfItem, IntInfItem};
pub(crate) use info::InfoItems;
pub use params::*;
pub use sensitivity::{DualSensitivity, PrimalSensitivity, Sensitivity, SensitivityMark};
pub use solution::Solution;
pub use types::*;

/// An optimization problem together with its parameters and the
/// results of the last solve
pub struct Task<'env> {
    env: &'env Env,
    pub(crate) data: TaskData,
    pub(crate) params: Parameters,

    // indexed by `sol_index`
    solutions: [Option<Solution>; 3],
    // statuses of variables then constraints, for simplex warm starts
    warm_basis: Option<Vec<VarStatus>>,
    // dimensions when the warm basis was stored
    warm_dims: (usize, usize),
    basis_solve: Option<sensitivity::BasisSolve>,

    pub(crate) info: InfoItems,
    warnings: Vec<NumericalWarning>,
    termination: Option<TerminationCode>,

    callback: Option<ProgressCallback>,
    print: PrintTarget,
}

fn sol_index(whichsol: SolutionType) -> usize {
    match whichsol {
        SolutionType::Basic => 0,
        SolutionType::Interior => 1,
        SolutionType::Integer => 2,
    }
}

impl<'env> Task<'env> {
    pub fn new(env: &'env Env) -> Self {
        Self::from_parts(env, TaskData::default(), Parameters::default())
    }

    pub(crate) fn from_parts(env: &'env Env, data: TaskData, params: Parameters) -> Self {
        Self {
            env,
            data,
            params,
            solutions: [None, None, None],
            warm_basis: None,
            warm_dims: (0, 0),
            basis_solve: None,
            info: InfoItems::default(),
            warnings: Vec::new(),
            termination: None,
            callback: None,
            print: PrintTarget::default(),
        }
    }

    /// A copy of the problem, parameters and solutions.  The progress
    /// callback is not copied.
    pub fn duplicate(&self) -> Task<'env> {
        Task {
            env: self.env,
            data: self.data.clone(),
            params: self.params.clone(),
            solutions: self.solutions.clone(),
            warm_basis: self.warm_basis.clone(),
            warm_dims: self.warm_dims,
            basis_solve: None,
            info: self.info.clone(),
            warnings: self.warnings.clone(),
            termination: self.termination,
            callback: None,
            print: self.print.duplicate(),
        }
    }

    pub fn env(&self) -> &'env Env {
        self.env
    }

    // ---------------------------------
    // parameters
    // ---------------------------------

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Replace all parameters
    pub fn set_parameters(&mut self, params: Parameters) -> Result<(), ParameterError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn put_int_param(&mut self, name: &str, value: i32) -> Result<(), ParameterError> {
        self.params.put_int_param(name, value)
    }

    pub fn put_double_param(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        self.params.put_double_param(name, value)
    }

    pub fn put_string_param(&mut self, name: &str, value: &str) -> Result<(), ParameterError> {
        self.params.put_string_param(name, value)
    }

    pub fn put_param(&mut self, name: &str, text: &str) -> Result<(), ParameterError> {
        self.params.put_param(name, text)
    }

    pub fn get_int_param(&self, name: &str) -> Result<i32, ParameterError> {
        self.params.get_int_param(name)
    }

    pub fn get_double_param(&self, name: &str) -> Result<f64, ParameterError> {
        self.params.get_double_param(name)
    }

    pub fn get_string_param(&self, name: &str) -> Result<String, ParameterError> {
        self.params.get_string_param(name)
    }

    // ---------------------------------
    // callbacks and log stream
    // ---------------------------------

    /// Install a progress callback.  A nonzero return value stops the
    /// running engine at its next iteration boundary.
    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Progress) -> i32 + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn unset_progress_callback(&mut self) {
        self.callback = None;
    }

    pub(crate) fn take_callback(&mut self) -> Option<ProgressCallback> {
        self.callback.take()
    }

    pub(crate) fn restore_callback(&mut self, callback: Option<ProgressCallback>) {
        self.callback = callback;
    }

    /// Move the print target out for the duration of a solve
    pub(crate) fn take_print(&mut self) -> PrintTarget {
        std::mem::replace(&mut self.print, PrintTarget::Buffer(Vec::new()))
    }

    pub(crate) fn restore_print(&mut self, print: PrintTarget) {
        self.print = print;
    }

    pub(crate) fn print_target(&mut self) -> &mut PrintTarget {
        &mut self.print
    }

    // ---------------------------------
    // results
    // ---------------------------------

    /// Termination code of the last `optimize`, if any
    pub fn termination_code(&self) -> Option<TerminationCode> {
        self.termination
    }

    /// Numerical warnings of the last solve
    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    pub fn get_int_inf(&self, item: IntInfItem) -> i64 {
        self.info.int(item)
    }

    pub fn get_dou_inf(&self, item: DouInfItem) -> f64 {
        self.info.double(item)
    }

    pub fn solution_defined(&self, whichsol: SolutionType) -> bool {
        self.solutions[sol_index(whichsol)].is_some()
    }

    /// The full solution record
    pub fn get_solution(&self, whichsol: SolutionType) -> Result<&Solution, DataError> {
        self.solutions[sol_index(whichsol)]
            .as_ref()
            .ok_or(DataError::UndefinedSolution(whichsol))
    }

    pub fn get_sol_sta(&self, whichsol: SolutionType) -> Result<SolutionStatus, DataError> {
        Ok(self.get_solution(whichsol)?.solsta)
    }

    pub fn get_pro_sta(&self, whichsol: SolutionType) -> Result<ProblemStatus, DataError> {
        Ok(self.get_solution(whichsol)?.prosta)
    }

    pub fn get_xx(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.xx)
    }

    pub fn get_xc(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.xc)
    }

    pub fn get_y(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.y)
    }

    pub fn get_slc(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.slc)
    }

    pub fn get_suc(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.suc)
    }

    pub fn get_slx(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.slx)
    }

    pub fn get_sux(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.sux)
    }

    pub fn get_snx(&self, whichsol: SolutionType) -> Result<&[f64], DataError> {
        Ok(&self.get_solution(whichsol)?.snx)
    }

    pub fn get_skx(&self, whichsol: SolutionType) -> Result<&[StaKey], DataError> {
        Ok(&self.get_solution(whichsol)?.skx)
    }

    pub fn get_skc(&self, whichsol: SolutionType) -> Result<&[StaKey], DataError> {
        Ok(&self.get_solution(whichsol)?.skc)
    }

    pub fn get_primal_obj(&self, whichsol: SolutionType) -> Result<f64, DataError> {
        Ok(self.get_solution(whichsol)?.pobj)
    }

    pub fn get_dual_obj(&self, whichsol: SolutionType) -> Result<f64, DataError> {
        Ok(self.get_solution(whichsol)?.dobj)
    }

    /// Violation measures of a solution against the current problem
    pub fn get_solution_info(&self, whichsol: SolutionType) -> Result<SolutionInfo, OptimizeError> {
        let sol = self.get_solution(whichsol)?;
        let problem = self.data.to_problem(self.env)?;

        // measured in the minimization form
        let mut sol = sol.clone();
        sol.apply_sense(self.data.sense);
        let mut info = problem.solution_info(&sol);
        info.primal_obj = self.get_primal_obj(whichsol)?;
        info.dual_obj = self.get_dual_obj(whichsol)?;
        Ok(info)
    }

    // ---------------------------------
    // internal state handling
    // ---------------------------------

    pub(crate) fn set_solution(&mut self, whichsol: SolutionType, sol: Option<Solution>) {
        self.solutions[sol_index(whichsol)] = sol;
    }

    pub(crate) fn clear_results(&mut self) {
        self.solutions = [None, None, None];
        self.termination = None;
    }

    /// Forget results after a change of bounds or objective.  The basis
    /// stays available as a warm start.
    pub(crate) fn invalidate_values(&mut self) {
        self.clear_results();
    }

    /// Forget results and factorizations after a structural change
    pub(crate) fn invalidate_structure(&mut self) {
        self.clear_results();
        self.basis_solve = None;
    }

    /// Warm start basis padded to the current dimensions
    pub(crate) fn warm_basis(&self) -> Option<Vec<VarStatus>> {
        let basis = self.warm_basis.as_ref()?;
        let (n, m) = (self.data.numvar(), self.data.numcon());
        let (n0, m0) = self.warm_dims;
        if basis.len() != n0 + m0 || n0 > n || m0 > m {
            return None;
        }
        let mut out = basis[..n0].to_vec();
        out.resize(n, VarStatus::AtLower);
        out.extend_from_slice(&basis[n0..]);
        out.resize(n + m, VarStatus::Basic);
        Some(out)
    }

    /// Take over the solutions, information items and warm start of
    /// `other`, a solved copy of this task
    pub(crate) fn adopt_results(&mut self, other: &Task) {
        self.solutions = other.solutions.clone();
        self.info = other.info.clone();
        self.warnings = other.warnings.clone();
        self.termination = other.termination;
        self.warm_basis = other.warm_basis.clone();
        self.warm_dims = other.warm_dims;
        self.basis_solve = None;
    }

    pub(crate) fn set_warm_basis(&mut self, basis: Option<Vec<VarStatus>>) {
        self.warm_dims = (self.data.numvar(), self.data.numcon());
        self.warm_basis = basis;
    }
}

impl ConfigurablePrintTarget for Task<'_> {
    fn print_to_stdout(&mut self) {
        self.print.print_to_stdout();
    }

    fn print_to_file(&mut self, file: File) {
        self.print.print_to_file(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.print.print_to_stream(stream);
    }

    fn print_to_buffer(&mut self) {
        self.print.print_to_buffer();
    }

    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.print.get_print_buffer()
    }
}
