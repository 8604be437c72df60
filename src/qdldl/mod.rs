//! Sparse quasidefinite $LDL^T$ factorization.
//!
//! Factors symmetric quasidefinite matrices supplied in upper triangular
//! CSC form, using an AMD fill-reducing ordering.  This is the linear
//! system engine behind the interior point KKT solves.

mod qdldl;
pub use qdldl::*;
