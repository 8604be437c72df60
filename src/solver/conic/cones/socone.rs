use super::*;

/// The second order cone `{(t, x) : ‖x‖ ≤ t}`.  Quadratic and rotated
/// quadratic task cones map here.
///
/// The scaling is stored compactly as a scalar `η` and a vector `w`
/// with `wᵀJw = 1`, where `J = diag(1, -1, ..., -1)`.  Then
/// `WᵀW = η²(2wwᵀ - J)`.
pub struct SecondOrderCone<T: FloatT = f64> {
    dim: usize,
    w: Vec<T>,
    η: T,
    // λ = Wz
    λ: Vec<T>,
}

impl<T> SecondOrderCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 2);
        let mut w = vec![T::zero(); dim];
        w[0] = T::one();
        Self {
            dim,
            w,
            η: T::one(),
            λ: vec![T::zero(); dim],
        }
    }
}

impl<T> Cone<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        1
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

    // rows of one cone share a single scaling, the mean of theirs
    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        let mean = e.mean();
        for (δi, &ei) in δ.iter_mut().zip(e) {
            *δi = mean / ei;
        }
        true
    }

    fn margins(&mut self, z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        let α = z[0] - z[1..].norm();
        (α, T::max(α, T::zero()))
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, _pd: PrimalOrDualCone) {
        z[0] += α;
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        for v in [z, s] {
            v.set(T::zero());
            v[0] = T::one();
        }
    }

    fn set_identity_scaling(&mut self) {
        self.w.set(T::zero());
        self.w[0] = T::one();
        self.η = T::one();
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T, _strategy: ScalingStrategy) -> bool {
        let (sres, zres) = (residual(s), residual(z));
        if sres <= T::zero() || zres <= T::zero() {
            return false;
        }
        let two: T = (2.0).as_T();
        let (snorm, znorm) = (sres.sqrt(), zres.sqrt());

        // w is the normalized midpoint of s/‖s‖ and Jz/‖z‖
        let γ = T::sqrt((T::one() + s.dot(z) / (snorm * znorm)) / two);
        let (cs, cz) = ((two * snorm * γ).recip(), (two * znorm * γ).recip());
        self.w[0] = cs * s[0] + cz * z[0];
        for (wi, &si, &zi) in itertools::izip!(&mut self.w[1..], &s[1..], &z[1..]) {
            *wi = cs * si - cz * zi;
        }
        self.η = T::sqrt(snorm / znorm);

        mul_W_compact(&mut self.λ, z, T::one(), T::zero(), &self.w, self.η);

        self.η.is_finite() && self.w.is_finite()
    }

    fn Hs_is_diagonal(&self) -> bool {
        false
    }

    // WᵀW = η²(2wwᵀ - J), packed triu by columns
    fn get_Hs(&self, Hsblock: &mut [T]) {
        let two: T = (2.0).as_T();
        let η2 = self.η * self.η;
        let mut k = 0;
        for col in 0..self.dim {
            for row in 0..=col {
                let J = match (row == col, row) {
                    (false, _) => T::zero(),
                    (true, 0) => T::one(),
                    (true, _) => -T::one(),
                };
                Hsblock[k] = η2 * (two * self.w[row] * self.w[col] - J);
                k += 1;
            }
        }
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        // W is symmetric, so Hs x = W(Wx)
        mul_W_compact(work, x, T::one(), T::zero(), &self.w, self.η);
        mul_W_compact(y, work, T::one(), T::zero(), &self.w, self.η);
    }

    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        jordan_product(ds, &self.λ, &self.λ);
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        self._combined_ds_shift_symmetric(shift, step_z, step_s, σμ);
    }

    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], _z: &[T]) {
        self._Δs_from_Δz_offset_symmetric(out, ds, work);
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
        (max_step(z, dz, αmax), max_step(s, ds, αmax))
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let rs = residual_shifted(s, ds, α);
        let rz = residual_shifted(z, dz, α);
        if rs <= T::zero() || rz <= T::zero() {
            return T::infinity();
        }
        let half: T = (0.5).as_T();
        -half * (rs * rz).logsafe()
    }
}

impl<T> SymmetricCone<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]) {
        jordan_solve(x, &self.λ, z);
    }

    fn mul_W(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        mul_W_compact(y, x, α, β, &self.w, self.η);
    }

    fn mul_Winv(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        mul_Winv_compact(y, x, α, β, &self.w, self.η);
    }
}

impl<T> JordanAlgebra<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        jordan_product(x, y, z);
    }
}

// x = y∘z = (yᵀz, y₀z₁ + z₀y₁)
fn jordan_product<T: FloatT>(x: &mut [T], y: &[T], z: &[T]) {
    x[0] = y.dot(z);
    x[1..].waxpby(y[0], &z[1..], z[0], &y[1..]);
}

// x = y \ z, the solution of y∘x = z
fn jordan_solve<T: FloatT>(x: &mut [T], y: &[T], z: &[T]) {
    let det = residual(y);
    let yz = y[1..].dot(&z[1..]);
    x[0] = (y[0] * z[0] - yz) / det;
    x[1..].waxpby((yz / y[0] - z[0]) / det, &y[1..], y[0].recip(), &z[1..]);
}

// z₀² - ‖z₁‖²
fn residual<T: FloatT>(z: &[T]) -> T {
    z[0] * z[0] - z[1..].sumsq()
}

fn residual_shifted<T: FloatT>(z: &[T], dz: &[T], α: T) -> T {
    let head = z[0] + α * dz[0];
    let tail = <[T] as VectorMath>::dot_shifted(&z[1..], &z[1..], &dz[1..], &dz[1..], α);
    head * head - tail
}

// Largest α ≤ αmax keeping x + αd in the cone: the smallest positive
// root of the quadratic residual(x + αd) = aα² + bα + c
fn max_step<T: FloatT>(x: &[T], d: &[T], αmax: T) -> T {
    let two: T = (2.).as_T();
    let four: T = (4.).as_T();

    let a = residual(d);
    let b = two * (x[0] * d[0] - x[1..].dot(&d[1..]));
    let c = residual(x);
    if c < T::zero() {
        return T::zero();
    }
    let disc = b * b - four * a * c;
    if a == T::zero() {
        return if b < T::zero() { T::min(αmax, -c / b) } else { αmax };
    }
    if disc < T::zero() || (a > T::zero() && b > T::zero()) {
        return αmax;
    }
    if c == T::zero() {
        return if a > T::zero() { αmax } else { T::zero() };
    }

    // both roots without cancellation
    let q = if b >= T::zero() { -b - disc.sqrt() } else { -b + disc.sqrt() };
    [two * c / q, q / (two * a)]
        .into_iter()
        .filter(|&r| r >= T::zero())
        .fold(αmax, T::min)
}

// y = αWx + βy where W = η[w₀ w₁ᵀ; w₁ I + w₁w₁ᵀ/(1 + w₀)]
fn mul_W_compact<T: FloatT>(y: &mut [T], x: &[T], α: T, β: T, w: &[T], η: T) {
    let ζ = w[1..].dot(&x[1..]);
    let c = x[0] + ζ / (T::one() + w[0]);
    let αη = α * η;

    y[0] = αη * (w[0] * x[0] + ζ) + β * y[0];
    y[1..].axpby(αη * c, &w[1..], β);
    y[1..].axpby(αη, &x[1..], T::one());
}

// y = αW⁻¹x + βy where W⁻¹ = [w₀ -w₁ᵀ; -w₁ I + w₁w₁ᵀ/(1 + w₀)]/η
fn mul_Winv_compact<T: FloatT>(y: &mut [T], x: &[T], α: T, β: T, w: &[T], η: T) {
    let ζ = w[1..].dot(&x[1..]);
    let c = ζ / (T::one() + w[0]) - x[0];
    let αη = α / η;

    y[0] = αη * (w[0] * x[0] - ζ) + β * y[0];
    y[1..].axpby(αη * c, &w[1..], β);
    y[1..].axpby(αη, &x[1..], T::one());
}
