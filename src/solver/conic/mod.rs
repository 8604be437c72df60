//! Homogeneous embedding interior point engine.
//!
//! Solves problems in the standard form
//!
//! ```text
//! min  ½xᵀPx + qᵀx
//! s.t. Ax + s = b,  s ∈ K
//! ```
//!
//! with `K` a product of the cones in [`cones`].  Task-level problems
//! are converted to this form before the engine is called, and the
//! engine's solution is mapped back afterwards.

pub mod cones;
mod info;
mod info_print;
mod kkt;
mod problemdata;
mod residuals;
mod settings;
mod solution;
mod solver;
mod variables;

pub use info::*;
pub(crate) use info_print::*;
pub(crate) use kkt::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use variables::*;

pub use cones::SupportedConeT;

#[cfg(test)]
mod tests;
