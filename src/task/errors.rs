use crate::algebra::SparseFormatError;
use crate::lu::LuError;
use crate::qdldl::QDLDLError;
use super::types::SolutionType;
use crate::solver::conic::ConicSolverError;
use thiserror::Error;

/// Errors from building or modifying a task
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("variable index {0} out of range")]
    VariableIndex(usize),
    #[error("constraint index {0} out of range")]
    ConstraintIndex(usize),
    #[error("cone index {0} out of range")]
    ConeIndex(usize),
    #[error("{what} {index}: lower bound {lb} exceeds upper bound {ub}")]
    BoundOrder {
        what: &'static str,
        index: usize,
        lb: f64,
        ub: f64,
    },
    #[error("{what} {index}: fixed bound with lower {lb} different from upper {ub}")]
    FixedMismatch {
        what: &'static str,
        index: usize,
        lb: f64,
        ub: f64,
    },
    #[error("{what} {index}: bound value {value} is not finite")]
    NonFiniteBound {
        what: &'static str,
        index: usize,
        value: f64,
    },
    #[error("cone {index}: {reason}")]
    ConeDimension { index: usize, reason: &'static str },
    #[error("cone {index}: variable {var} listed more than once")]
    DuplicateConeMember { index: usize, var: usize },
    #[error("quadratic term ({i},{j}) is not in the lower triangle")]
    QuadraticUpperTriangle { i: usize, j: usize },
    #[error("coefficient at ({i},{j}) is not finite")]
    NonFiniteValue { i: usize, j: usize },
    #[error("argument lengths differ: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("column {0}: ptrb/ptre out of order or out of range")]
    BadColumnPointers(usize),
    #[error("an initial solution can only be given for the integer solution")]
    BadSolutionType,
    #[error("the {0} solution is not defined")]
    UndefinedSolution(SolutionType),
    #[error("malformed task file: {0}")]
    File(String),
}

/// Errors from reading or writing parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("unknown parameter \"{0}\"")]
    UnknownName(String),
    #[error("parameter \"{0}\" does not have this type")]
    WrongType(String),
    #[error("invalid value \"{value}\" for parameter \"{name}\"")]
    InvalidValue { name: String, value: String },
}

/// Unrecoverable errors of `optimize`.  No solution is produced.
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("invalid problem data: {0}")]
    Data(#[from] DataError),
    #[error("no optimizer applies: {0}")]
    NoApplicableOptimizer(&'static str),
    #[error("basis factorization failed: {0}")]
    Basis(#[from] LuError),
    #[error("KKT factorization could not be set up: {0}")]
    Kkt(#[from] QDLDLError),
    #[error("interior point setup failed: {0}")]
    Conic(#[from] ConicSolverError),
    #[error("sparse data is malformed: {0}")]
    Format(#[from] SparseFormatError),
    #[error("no basic solution is available")]
    NoBasis,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
