#![allow(non_snake_case)]

//! Reduced KKT system of the interior point iteration.
//!
//! Each step direction of the homogeneous embedding is computed from
//! two solves with the same quasidefinite matrix: a constant solve with
//! right hand side `[-q; b]`, done once per factorization, and a solve
//! for the variable part of each right hand side.  The τ direction is
//! then recovered in closed form.

use super::*;
use crate::algebra::*;
use crate::qdldl::QDLDLError;
use crate::solver::conic::cones::{CompositeCone, Cone};

mod assembly;
mod directldl;

use directldl::DirectLDLKKTSolver;

pub(crate) struct ConicKKTSystem<T: FloatT> {
    kktsolver: DirectLDLKKTSolver<T>,

    // solution vector for constant part of KKT solves
    x1: Vec<T>,
    z1: Vec<T>,

    // solution vector for general KKT solves
    x2: Vec<T>,
    z2: Vec<T>,

    // work vectors for assembling/disassembling vectors
    workx: Vec<T>,
    workz: Vec<T>,
    work_conic: Vec<T>,
}

impl<T> ConicKKTSystem<T>
where
    T: FloatT,
{
    pub fn new(
        data: &ConicProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &ConicSettings<T>,
    ) -> Result<Self, QDLDLError> {
        let (m, n) = (data.m, data.n);

        let kktsolver = DirectLDLKKTSolver::<T>::new(&data.P, &data.A, cones, settings)?;

        Ok(Self {
            kktsolver,
            x1: vec![T::zero(); n],
            z1: vec![T::zero(); m],
            x2: vec![T::zero(); n],
            z2: vec![T::zero(); m],
            workx: vec![T::zero(); n],
            workz: vec![T::zero(); m],
            work_conic: vec![T::zero(); m],
        })
    }

    /// number of factorizations that needed a retry with
    /// heavier regularization
    pub fn retry_count(&self) -> usize {
        self.kktsolver.retry_count
    }

    pub fn update(
        &mut self,
        data: &ConicProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &ConicSettings<T>,
    ) -> bool {
        if !self.kktsolver.update(cones, settings) {
            return false;
        }
        self.solve_constant_rhs(data, settings)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &mut self,
        lhs: &mut ConicVariables<T>,
        rhs: &ConicVariables<T>,
        data: &ConicProblemData<T>,
        variables: &ConicVariables<T>,
        cones: &mut CompositeCone<T>,
        step_direction: StepDirection,
        settings: &ConicSettings<T>,
    ) -> bool {
        let (x1, z1) = (&mut self.x1, &mut self.z1);
        let (x2, z2) = (&self.x2, &self.z2);
        let (workx, workz) = (&mut self.workx, &mut self.workz);

        // solve for (x1,z1)
        // -----------
        workx.copy_from(&rhs.x);

        // the constant term c in the step equation HₛΔz + Δs = -c
        let Δs_const_term = &mut self.work_conic;

        match step_direction {
            StepDirection::Affine => {
                Δs_const_term.copy_from(&variables.s);
            }
            StepDirection::Combined => {
                cones.Δs_from_Δz_offset(Δs_const_term, &rhs.s, &mut lhs.z, &variables.z);
            }
        }

        workz.waxpby(T::one(), Δs_const_term, -T::one(), &rhs.z);

        self.kktsolver.setrhs(workx, workz);
        if !self.kktsolver.solve(Some(x1), Some(z1), settings) {
            return false;
        }

        // solve for Δτ
        // -----------
        let ξ = workx;
        ξ.axpby(T::recip(variables.τ), &variables.x, T::zero());

        let two: T = (2.).as_T();
        let tau_num = rhs.τ - rhs.κ / variables.τ
            + data.q.dot(x1)
            + data.b.dot(z1)
            + two * data.P.quad_form(ξ, x1);

        // ξ - x2 for the quadratic form in the denominator
        let ξ_minus_x2 = ξ;
        ξ_minus_x2.axpby(-T::one(), x2, T::one());

        let mut tau_den = variables.κ / variables.τ - data.q.dot(x2) - data.b.dot(z2);
        tau_den += data.P.quad_form(ξ_minus_x2, ξ_minus_x2) - data.P.quad_form(x2, x2);

        // solve for (Δx,Δz)
        // -----------
        lhs.τ = tau_num / tau_den;
        lhs.x.waxpby(T::one(), x1, lhs.τ, x2);
        lhs.z.waxpby(T::one(), z1, lhs.τ, z2);

        // Δs = -(HₛΔz + c)
        // -------------
        cones.mul_Hs(&mut lhs.s, &lhs.z, workz);
        lhs.s.axpby(-T::one(), Δs_const_term, -T::one());

        // Δκ
        // --------------
        lhs.κ = -(rhs.κ + variables.κ * lhs.τ) / variables.τ;

        lhs.τ.is_finite() && lhs.κ.is_finite()
    }

    pub fn solve_initial_point(
        &mut self,
        variables: &mut ConicVariables<T>,
        data: &ConicProblemData<T>,
        settings: &ConicSettings<T>,
    ) -> bool {
        if data.P.nnz() == 0 {
            // LP initialization.  [0;b] gives (x,-s), [-q;0] gives z
            self.workx.fill(T::zero());
            self.workz.copy_from(&data.b);
            self.kktsolver.setrhs(&self.workx, &self.workz);
            let is_success =
                self.kktsolver
                    .solve(Some(&mut variables.x), Some(&mut variables.s), settings);
            variables.s.negate();

            if !is_success {
                return false;
            }

            self.workx.axpby(-T::one(), &data.q, T::zero());
            self.workz.fill(T::zero());

            self.kktsolver.setrhs(&self.workx, &self.workz);
            self.kktsolver
                .solve(None, Some(&mut variables.z), settings)
        } else {
            // QP initialization
            self.workx.scalarop_from(|q| -q, &data.q);
            self.workz.copy_from(&data.b);
            self.kktsolver.setrhs(&self.workx, &self.workz);
            let is_success =
                self.kktsolver
                    .solve(Some(&mut variables.x), Some(&mut variables.z), settings);
            variables.s.scalarop_from(|z| -z, &variables.z);
            is_success
        }
    }

    fn solve_constant_rhs(
        &mut self,
        data: &ConicProblemData<T>,
        settings: &ConicSettings<T>,
    ) -> bool {
        self.workx.axpby(-T::one(), &data.q, T::zero());
        self.kktsolver.setrhs(&self.workx, &data.b);
        self.kktsolver
            .solve(Some(&mut self.x2), Some(&mut self.z2), settings)
    }
}
