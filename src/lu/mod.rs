//! Sparse LU factorization for square unsymmetric matrices.
//!
//! Left-looking (Gilbert–Peierls) numeric factorization with a fill
//! reducing AMD column ordering computed on the pattern of $A + A^T$ and
//! threshold partial pivoting.  Solves with dense or sparse right-hand
//! sides, in plain or transposed mode.

mod factor;
mod solve;

pub use factor::*;

#[path = "test.rs"]
#[cfg(test)]
mod test;
