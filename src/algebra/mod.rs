//! Linear algebra layer of the optimizer.
//!
//! All numerical kernels (interior point, factorizations, simplex) work
//! on floating point values implementing [`FloatT`] and go through the
//! [`VectorMath`] and [`MatrixMath`] traits defined here.  Sparse data
//! is held in [`CscMatrix`], sparse right-hand sides and solutions of
//! triangular solves in [`SparseVector`] and small dense blocks (cone
//! scalings) in [`Matrix`].

mod csc;
mod dense;
mod error_types;
mod floats;
mod math_traits;
mod matrix_types;
mod scalarmath;
mod sparsevec;
mod vecmath;

pub use csc::*;
pub use dense::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_types::*;
pub(crate) use scalarmath::*;
pub use sparsevec::*;
