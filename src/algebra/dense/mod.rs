#![allow(non_snake_case)]

// Native dense kernels for the small blocks arising in cone
// scalings.  Sizes are tiny (3x3 for nonsymmetric cones, the
// matrix order for PSD cones) so no blocking is attempted.

mod cholesky;
mod core;
mod eigen;
mod svd;

pub use self::core::*;
pub use cholesky::*;
pub use eigen::*;
pub use svd::*;
