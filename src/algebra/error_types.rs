use thiserror::Error;

/// Error type returned by matrix concatenation operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatrixConcatenationError {
    #[error("Incompatible dimensions")]
    /// Indicates inputs have incompatible dimension
    IncompatibleDimension,
}

#[derive(Error, Debug, PartialEq, Eq)]
/// Error type returned by sparse matrix assembly operations.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Data is not sorted by row index within each column
    #[error("Data is not sorted by row index within each column")]
    BadRowOrdering,
    #[error("Row value exceeds the matrix row dimension")]
    /// Row value exceeds the matrix row dimension
    BadRowval,
    #[error("Bad column pointer values")]
    /// Matrix column pointer values are defective
    BadColptr,
    #[error("sparsity pattern mismatch")]
    /// Operation on matrices that have mismatching sparsity patterns
    SparsityMismatch,
}

/// Error type returned by the native dense factorization routines.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Cholesky factorization failed: matrix not positive definite at column {0}")]
    Cholesky(usize),
    #[error("Eigendecomposition did not converge")]
    Eigen,
    #[error("SVD did not converge")]
    SVD,
}
