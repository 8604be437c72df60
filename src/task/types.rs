//! Enumerations and small records of the task API.

use std::fmt;

macro_rules! serde_enum {
    ($(#[$meta:meta])* pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }
    };
}

serde_enum! {
    /// Which of the lower and upper bound of a variable or constraint
    /// are active
    pub enum BoundKey {
        /// no bounds
        Free,
        /// lower bound equals upper bound
        Fixed,
        /// lower bound only
        Lower,
        /// upper bound only
        Upper,
        /// both bounds
        Range,
    }
}

serde_enum! {
    pub enum VariableType {
        Continuous,
        Integer,
    }
}

serde_enum! {
    pub enum ObjSense {
        Minimize,
        Maximize,
    }
}

serde_enum! {
    /// The three solutions kept by a task
    pub enum SolutionType {
        /// simplex or crossover solution with basis status keys
        Basic,
        /// interior point solution
        Interior,
        /// solution of a problem with integer variables
        Integer,
    }
}

serde_enum! {
    /// Basis status of a variable or constraint
    pub enum StaKey {
        Basic,
        AtLower,
        AtUpper,
        Fixed,
        /// nonbasic strictly between its bounds (free variables)
        SuperBasic,
        Unknown,
    }
}

serde_enum! {
    pub enum SolutionStatus {
        Optimal,
        IntegerOptimal,
        PrimalFeasible,
        /// the dual values form a Farkas certificate
        PrimalInfeasibleCertificate,
        /// the primal values form an improving ray
        DualInfeasibleCertificate,
        Unknown,
    }
}

serde_enum! {
    pub enum ProblemStatus {
        PrimalAndDualFeasible,
        PrimalInfeasible,
        DualInfeasible,
        Unknown,
    }
}

serde_enum! {
    /// Engine selection for `optimize`
    pub enum OptimizerType {
        /// simplex for linear problems, interior point otherwise and
        /// branch-and-bound when integer variables are present
        Free,
        /// interior point for any continuous problem
        Intpnt,
        /// same as `Intpnt`
        Conic,
        PrimalSimplex,
        /// branch-and-bound, also for purely continuous problems
        MixedInt,
    }
}

serde_enum! {
    /// Order in which open branch-and-bound nodes are explored
    pub enum NodeSelection {
        /// smallest relaxation bound first
        BestBound,
        /// most recently created node first
        DepthFirst,
    }
}

serde_enum! {
    pub enum SimplexPricing {
        Dantzig,
        Bland,
    }
}

/// Type of a cone constraint on a list of variables.
///
/// * `Quadratic`: `x₀ ≥ ‖x₁..‖`
/// * `RotatedQuadratic`: `2x₀x₁ ≥ ‖x₂..‖²`, `x₀, x₁ ≥ 0`
/// * `PrimalExp`: `x₀ ≥ x₁ exp(x₂/x₁)`, `x₀, x₁ ≥ 0`
/// * `PrimalPower(α)`: `x₀^α x₁^(1-α) ≥ |x₂|`, `x₀, x₁ ≥ 0`
/// * `PsdTriangle(k)`: the upper triangle of a symmetric `k×k`
///   matrix, listed by columns, is positive semidefinite
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConeType {
    Quadratic,
    RotatedQuadratic,
    PrimalExp,
    PrimalPower(f64),
    PsdTriangle(usize),
}

impl ConeType {
    /// Check that a cone with `dim` members is valid for this type
    pub(crate) fn check_dim(&self, dim: usize) -> Result<(), &'static str> {
        match *self {
            ConeType::Quadratic if dim < 1 => Err("quadratic cone needs at least 1 member"),
            ConeType::RotatedQuadratic if dim < 2 => {
                Err("rotated quadratic cone needs at least 2 members")
            }
            ConeType::PrimalExp if dim != 3 => Err("exponential cone needs exactly 3 members"),
            ConeType::PrimalPower(_) if dim != 3 => Err("power cone needs exactly 3 members"),
            ConeType::PrimalPower(α) if !(α > 0.0 && α < 1.0) => {
                Err("power cone exponent must lie in (0,1)")
            }
            ConeType::PsdTriangle(k) if k == 0 || dim != k * (k + 1) / 2 => {
                Err("PSD cone needs k(k+1)/2 members")
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A cone constraint: a type and its ordered member variables
#[derive(PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cone {
    pub ctype: ConeType,
    pub members: Vec<usize>,
}

/// Violation measures of a solution, see
/// [`Task::get_solution_info`](crate::task::Task::get_solution_info)
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionInfo {
    pub primal_obj: f64,
    pub dual_obj: f64,
    /// largest violation of a variable bound
    pub max_pbound_viol: f64,
    /// largest violation of a constraint bound
    pub max_pcon_viol: f64,
    /// largest violation of a cone membership
    pub max_pcone_viol: f64,
    /// largest violation of integrality
    pub max_pint_viol: f64,
    /// largest violation of the dual constraints and dual signs
    pub max_dual_viol: f64,
}

#[test]
fn test_cone_dimension_rules() {
    assert!(ConeType::Quadratic.check_dim(1).is_ok());
    assert!(ConeType::Quadratic.check_dim(0).is_err());
    assert!(ConeType::RotatedQuadratic.check_dim(1).is_err());
    assert!(ConeType::PrimalExp.check_dim(4).is_err());
    assert!(ConeType::PrimalPower(0.5).check_dim(3).is_ok());
    assert!(ConeType::PrimalPower(1.0).check_dim(3).is_err());
    assert!(ConeType::PsdTriangle(3).check_dim(6).is_ok());
    assert!(ConeType::PsdTriangle(3).check_dim(5).is_err());
}
