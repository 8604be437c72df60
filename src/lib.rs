//! __conicopt__ is a sparse optimizer for linear, quadratic, conic and
//! mixed-integer problems behind a task-based API.  A task holds one
//! problem
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize or maximize} & \frac{1}{2}x^T Q x + c^T x + c^f\\\\\[2ex\]
//!  \text{subject to} & l^c \le Ax \le u^c \\\\\[1ex\]
//!         & l^x \le x \le u^x \\\\\[1ex\]
//!         & x \in \mathcal{K},\quad x_j \in \mathbb{Z},\ j \in \mathcal{J}
//!  \end{array}
//! $$
//!
//! where $\mathcal{K}$ is a product of quadratic, rotated quadratic,
//! exponential, power and semidefinite cones over subsets of the
//! variables.
//!
//! ## Features
//!
//! * __Engines__: a bounded primal simplex with warm starts for linear
//!   problems, a homogeneous embedding interior point method for
//!   quadratic and conic problems, and branch-and-bound over either.
//!
//! * __Certificates__: infeasible and unbounded problems are reported
//!   with Farkas certificates and improving rays.
//!
//! * __Analysis__: basis solves, bound and cost sensitivity, primal
//!   feasibility repair.
//!
//! ## Example
//!
//! ```
//! use conicopt::*;
//!
//! let env = Env::new();
//! let mut task = Task::new(&env);
//! // maximize x0 + x1  s.t.  x0 + 2x1 ≤ 4,  x ≥ 0
//! task.input_data_dense(
//!     &[1.0, 1.0],
//!     0.0,
//!     &[vec![1.0, 2.0]],
//!     &[BoundKey::Upper],
//!     &[0.0],
//!     &[4.0],
//!     &[BoundKey::Range; 2],
//!     &[0.0; 2],
//!     &[3.0; 2],
//! )
//! .unwrap();
//! task.put_obj_sense(ObjSense::Maximize);
//! task.put_param("log_level", "0").unwrap();
//!
//! let code = task.optimize().unwrap();
//! assert_eq!(code, TerminationCode::Ok);
//! assert_eq!(task.get_sol_sta(SolutionType::Basic).unwrap(), SolutionStatus::Optimal);
//! assert!((task.get_primal_obj(SolutionType::Basic).unwrap() - 3.5).abs() < 1e-9);
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod env;
pub mod io;
pub mod lu;
pub(crate) mod presolve;
pub mod qdldl;
pub mod solver;
pub mod task;
pub mod timers;

pub use algebra::{CscMatrix, SparseVector};
pub use env::Env;
pub use io::{ConfigurablePrintTarget, PrintTarget};
pub use solver::concurrent::{optimize_concurrent, optimize_concurrent_mio, ConcurrentResult};
pub use solver::{CallbackCode, NumericalWarning, Progress, TerminationCode};
pub use task::*;
