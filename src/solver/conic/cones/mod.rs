#![allow(non_snake_case)]

//! Cones supported by the interior point engine.
//!
//! The engine solves problems over a product of cones held in a
//! [`CompositeCone`].  Every member implements the [`Cone`] trait, which
//! provides the scaling, centrality and step length operations used by
//! the predictor-corrector iteration.  Dispatch from the composite to its
//! members is static through the [`SupportedCone`] enum.

use crate::algebra::*;
use crate::solver::conic::ConicSettings;
use enum_dispatch::*;

mod compositecone;
mod expcone;
mod nonnegativecone;
mod nonsymmetric_common;
mod powcone;
mod psdtrianglecone;
mod socone;
mod symmetric_common;
mod zerocone;

pub use compositecone::*;
pub use expcone::*;
pub use nonnegativecone::*;
pub use powcone::*;
pub use psdtrianglecone::*;
pub use socone::*;
pub use zerocone::*;

pub(crate) use nonsymmetric_common::*;
pub(crate) use symmetric_common::*;

/// Selects between the primal and dual cone in operations
/// that differ for nonsymmetric cones
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum PrimalOrDualCone {
    PrimalCone,
    DualCone,
}

/// Scaling strategy used when linearizing centrality conditions
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum ScalingStrategy {
    PrimalDual,
    Dual,
}

/// Description of a single cone in the engine's standard form.
///
/// Rows of the constraint matrix are partitioned in order over a list
/// of these descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportedConeT<T> {
    /// The zero cone, i.e. equality rows
    ZeroConeT(usize),
    /// The nonnegative orthant
    NonnegativeConeT(usize),
    /// The second order cone `{(t,x) : ‖x‖ ≤ t}`
    SecondOrderConeT(usize),
    /// The exponential cone `{(x,y,z) : y e^(x/y) ≤ z, y > 0}`
    ExponentialConeT(),
    /// The power cone `{(x,y,z) : x^α y^(1-α) ≥ |z|, x,y ≥ 0}`
    PowerConeT(T),
    /// The positive semidefinite cone of order `n`, in scaled
    /// upper triangular form of dimension `n(n+1)/2`
    PSDTriangleConeT(usize),
}

impl<T> SupportedConeT<T> {
    /// Number of rows occupied by the cone
    pub fn nvars(&self) -> usize {
        match self {
            SupportedConeT::ZeroConeT(dim) => *dim,
            SupportedConeT::NonnegativeConeT(dim) => *dim,
            SupportedConeT::SecondOrderConeT(dim) => *dim,
            SupportedConeT::ExponentialConeT() => 3,
            SupportedConeT::PowerConeT(_) => 3,
            SupportedConeT::PSDTriangleConeT(dim) => triangular_number(*dim),
        }
    }

    pub(crate) fn as_tag(&self) -> &'static str {
        match self {
            SupportedConeT::ZeroConeT(_) => "ZeroCone",
            SupportedConeT::NonnegativeConeT(_) => "NonnegativeCone",
            SupportedConeT::SecondOrderConeT(_) => "SecondOrderCone",
            SupportedConeT::ExponentialConeT() => "ExponentialCone",
            SupportedConeT::PowerConeT(_) => "PowerCone",
            SupportedConeT::PSDTriangleConeT(_) => "PSDTriangleCone",
        }
    }
}

/// Operations required of every cone by the interior point engine
#[enum_dispatch]
pub trait Cone<T>
where
    T: FloatT,
{
    /// Barrier degree of the cone
    fn degree(&self) -> usize;

    /// Number of rows occupied by the cone
    fn numel(&self) -> usize;

    fn is_symmetric(&self) -> bool;

    fn allows_primal_dual_scaling(&self) -> bool;

    /// Write into `δ` the correction to an elementwise equilibration
    /// `e` required by this cone.  Returns true if a change was made.
    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool;

    /// Returns (α,β) with α the minimum margin of `z` from the cone
    /// boundary and β the total positive margin
    fn margins(&mut self, z: &mut [T], pd: PrimalOrDualCone) -> (T, T);

    /// z ← z + α e, with e the cone's unit element
    fn scaled_unit_shift(&self, z: &mut [T], α: T, pd: PrimalOrDualCone);

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]);

    fn set_identity_scaling(&mut self);

    /// Update the scaling at (s,z).  Returns false if the point is
    /// unsuitable, e.g. because it is not interior.
    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T, scaling_strategy: ScalingStrategy)
        -> bool;

    fn Hs_is_diagonal(&self) -> bool;

    /// Write the scaling matrix Hs into `Hsblock`, as a diagonal
    /// or as the upper triangle packed by columns
    fn get_Hs(&self, Hsblock: &mut [T]);

    /// y = Hs*x
    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]);

    /// Right hand side term for the affine step
    fn affine_ds(&self, ds: &mut [T], s: &[T]);

    /// Shift term for the combined (corrector) step.  The affine step
    /// directions may be overwritten.
    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T);

    /// Constant part of Δs when written as a function of Δz
    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]);

    /// Largest step lengths (αz,αs) ≤ αmax keeping z + αz dz and
    /// s + αs ds in the dual and primal cone respectively
    #[allow(clippy::too_many_arguments)]
    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T);

    /// Barrier value at (z + α dz, s + α ds)
    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T;
}

#[allow(clippy::large_enum_variant)]
#[enum_dispatch(Cone<T>)]
pub enum SupportedCone<T>
where
    T: FloatT,
{
    ZeroCone(ZeroCone<T>),
    NonnegativeCone(NonnegativeCone<T>),
    SecondOrderCone(SecondOrderCone<T>),
    ExponentialCone(ExponentialCone<T>),
    PowerCone(PowerCone<T>),
    PSDTriangleCone(PSDTriangleCone<T>),
}

impl<T: FloatT> SupportedCone<T> {
    pub(crate) fn as_tag(&self) -> &'static str {
        match self {
            SupportedCone::ZeroCone(_) => "ZeroCone",
            SupportedCone::NonnegativeCone(_) => "NonnegativeCone",
            SupportedCone::SecondOrderCone(_) => "SecondOrderCone",
            SupportedCone::ExponentialCone(_) => "ExponentialCone",
            SupportedCone::PowerCone(_) => "PowerCone",
            SupportedCone::PSDTriangleCone(_) => "PSDTriangleCone",
        }
    }
}

pub fn make_cone<T: FloatT>(cone: &SupportedConeT<T>) -> SupportedCone<T> {
    match cone {
        SupportedConeT::ZeroConeT(dim) => ZeroCone::new(*dim).into(),
        SupportedConeT::NonnegativeConeT(dim) => NonnegativeCone::new(*dim).into(),
        SupportedConeT::SecondOrderConeT(dim) => SecondOrderCone::new(*dim).into(),
        SupportedConeT::ExponentialConeT() => ExponentialCone::new().into(),
        SupportedConeT::PowerConeT(α) => PowerCone::new(*α).into(),
        SupportedConeT::PSDTriangleConeT(dim) => PSDTriangleCone::new(*dim).into(),
    }
}

#[cfg(test)]
mod tests;
