use super::*;

/// Cones with a Nesterov-Todd scaling `W` and scaled point `λ = Wz`.
pub(crate) trait SymmetricCone<T: FloatT>: JordanAlgebra<T> {
    fn mul_W(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T);
    fn mul_Winv(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T);

    // x = λ \ z
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]);
}

pub(crate) trait JordanAlgebra<T: FloatT> {
    // x = y∘z
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]);
}

/// Step computations written once in terms of `W` and the Jordan product.
pub(crate) trait SymmetricConeUtils<T: FloatT> {
    fn _combined_ds_shift_symmetric(
        &mut self,
        shift: &mut [T],
        step_z: &mut [T],
        step_s: &mut [T],
        σμ: T,
    );
    fn _Δs_from_Δz_offset_symmetric(&mut self, out: &mut [T], ds: &[T], work: &mut [T]);
}

impl<T, C> SymmetricConeUtils<T> for C
where
    T: FloatT,
    C: SymmetricCone<T> + Cone<T>,
{
    // shift = W⁻ᵀΔs ∘ WΔz - σμe for the corrector step.  The affine
    // step directions are scaled in place and `shift` doubles as
    // workspace.
    fn _combined_ds_shift_symmetric(
        &mut self,
        shift: &mut [T],
        step_z: &mut [T],
        step_s: &mut [T],
        σμ: T,
    ) {
        shift.copy_from(step_z);
        self.mul_W(MatrixShape::N, step_z, shift, T::one(), T::zero());
        shift.copy_from(step_s);
        self.mul_Winv(MatrixShape::T, step_s, shift, T::one(), T::zero());

        self.circ_op(shift, step_s, step_z);
        self.scaled_unit_shift(shift, -σμ, PrimalOrDualCone::PrimalCone);
    }

    // out = Wᵀ(λ \ ds)
    fn _Δs_from_Δz_offset_symmetric(&mut self, out: &mut [T], ds: &[T], work: &mut [T]) {
        self.λ_inv_circ_op(work, ds);
        self.mul_W(MatrixShape::T, out, work, T::one(), T::zero());
    }
}
