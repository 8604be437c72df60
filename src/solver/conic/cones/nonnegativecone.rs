use super::*;
use itertools::izip;

/// The nonnegative orthant.  Inequality rows and variable bounds of a
/// task land here.
///
/// The Nesterov-Todd scaling of the orthant is diagonal: `W = diag(d)`
/// with `d = √(s/z)`, and the scaled point is `λ = √(s∘z)`.
pub struct NonnegativeCone<T> {
    dim: usize,
    d: Vec<T>,
    λ: Vec<T>,
}

impl<T> NonnegativeCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            d: vec![T::one(); dim],
            λ: vec![T::zero(); dim],
        }
    }
}

impl<T> Cone<T> for NonnegativeCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.dim
    }

    fn numel(&self) -> usize {
        self.dim
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn allows_primal_dual_scaling(&self) -> bool {
        true
    }

    // any positive row scaling keeps the orthant
    fn rectify_equilibration(&self, δ: &mut [T], _e: &[T]) -> bool {
        δ.set(T::one());
        false
    }

    fn margins(&mut self, z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        let mut lo = T::infinity();
        let mut positive = T::zero();
        for &zi in z.iter() {
            lo = T::min(lo, zi);
            if zi > T::zero() {
                positive += zi;
            }
        }
        (lo, positive)
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, _pd: PrimalOrDualCone) {
        z.iter_mut().for_each(|zi| *zi += α);
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        z.set(T::one());
        s.set(T::one());
    }

    fn set_identity_scaling(&mut self) {
        self.d.set(T::one());
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T, _strategy: ScalingStrategy) -> bool {
        let mut ok = true;
        for (di, λi, &si, &zi) in izip!(self.d.iter_mut(), self.λ.iter_mut(), s, z) {
            *di = T::sqrt(si / zi);
            *λi = T::sqrt(si * zi);
            ok &= di.is_finite();
        }
        ok
    }

    fn Hs_is_diagonal(&self) -> bool {
        true
    }

    // Hs = W² = diag(s/z)
    fn get_Hs(&self, Hsblock: &mut [T]) {
        debug_assert_eq!(self.d.len(), Hsblock.len());
        for (h, &di) in Hsblock.iter_mut().zip(&self.d) {
            *h = di * di;
        }
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], _work: &mut [T]) {
        for (yi, &xi, &di) in izip!(y.iter_mut(), x, &self.d) {
            *yi = di * di * xi;
        }
    }

    // λ∘λ = s∘z
    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        for (dsi, &λi) in ds.iter_mut().zip(&self.λ) {
            *dsi = λi * λi;
        }
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        self._combined_ds_shift_symmetric(shift, step_z, step_s, σμ);
    }

    // W(λ \ ds) reduces to ds/z on the orthant
    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], _work: &mut [T], z: &[T]) {
        for (o, &dsi, &zi) in izip!(out.iter_mut(), ds, z) {
            *o = dsi / zi;
        }
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        _settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T) {
        // largest α with v + α dv ≥ 0, capped at αmax
        let ratio = |v: &[T], dv: &[T]| {
            v.iter()
                .zip(dv)
                .filter(|&(_, &dvi)| dvi < T::zero())
                .fold(αmax, |α, (&vi, &dvi)| T::min(α, -vi / dvi))
        };
        (ratio(z, dz), ratio(s, ds))
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        izip!(z, s, dz, ds).fold(T::zero(), |acc, (&zi, &si, &dzi, &dsi)| {
            acc - ((si + α * dsi) * (zi + α * dzi)).logsafe()
        })
    }
}

impl<T> SymmetricCone<T> for NonnegativeCone<T>
where
    T: FloatT,
{
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]) {
        for (xi, &zi, &λi) in izip!(x.iter_mut(), z, &self.λ) {
            *xi = zi / λi;
        }
    }

    // W is diagonal, so W = Wᵀ
    fn mul_W(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        for (yi, &xi, &di) in izip!(y.iter_mut(), x, &self.d) {
            *yi = α * di * xi + β * *yi;
        }
    }

    fn mul_Winv(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        for (yi, &xi, &di) in izip!(y.iter_mut(), x, &self.d) {
            *yi = α * xi / di + β * *yi;
        }
    }
}

impl<T> JordanAlgebra<T> for NonnegativeCone<T>
where
    T: FloatT,
{
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        for (xi, &yi, &zi) in izip!(x.iter_mut(), y, z) {
            *xi = yi * zi;
        }
    }
}
