use super::*;

/// The exponential cone, the closure of
/// `{(x, y, z) : y > 0, y e^{x/y} ≤ z}`.
///
/// The dual cone is `{(u, v, w) : u < 0, -u e^{v/u - 1} ≤ w}` with
/// barrier `f*(z) = -ln(z₂ - z₁ - z₁ ln(-z₃/z₁)) - ln(-z₁) - ln(z₃)`.
pub struct ExponentialCone<T: FloatT = f64> {
    data: Nonsymmetric3DScaling<T>,
}

impl<T> ExponentialCone<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            data: Nonsymmetric3DScaling::new(),
        }
    }
}

impl<T> Default for ExponentialCone<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cone<T> for ExponentialCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        3
    }

    fn numel(&self) -> usize {
        3
    }

    fn is_symmetric(&self) -> bool {
        false
    }

    fn allows_primal_dual_scaling(&self) -> bool {
        true
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    // unused: nonsymmetric problems start from unit_initialization
    fn margins(&mut self, _z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        (T::max_value(), T::zero())
    }

    fn scaled_unit_shift(&self, _z: &mut [T], _α: T, _pd: PrimalOrDualCone) {}

    // the central point, where s = z = -∇f(s)
    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        let center: [T; 3] = [
            (-1.051383945322714).as_T(),
            (0.556409619469370).as_T(),
            (1.258967884768947).as_T(),
        ];
        s.copy_from_slice(&center);
        z.copy_from_slice(&center);
    }

    fn set_identity_scaling(&mut self) {}

    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T, strategy: ScalingStrategy) -> bool {
        self.update_scaling_3d(s, z, μ, strategy)
    }

    fn Hs_is_diagonal(&self) -> bool {
        false
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        self.data.get_Hs(Hsblock);
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], _work: &mut [T]) {
        self.data.mul_Hs(y, x);
    }

    fn affine_ds(&self, ds: &mut [T], s: &[T]) {
        ds.copy_from(s);
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        self.combined_ds_shift_3d(shift, step_z, step_s, σμ);
    }

    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], _work: &mut [T], _z: &[T]) {
        out.copy_from(ds);
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T) {
        self.step_length_3d(dz, ds, z, s, settings, αmax)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        self.compute_barrier_3d(z, s, dz, ds, α)
    }
}

impl<T> Nonsymmetric3DCone<T> for ExponentialCone<T>
where
    T: FloatT,
{
    fn scaling(&self) -> &Nonsymmetric3DScaling<T> {
        &self.data
    }

    fn scaling_mut(&mut self) -> &mut Nonsymmetric3DScaling<T> {
        &mut self.data
    }

    fn is_primal_feasible(&self, s: &[T]) -> bool {
        let [x, y, z] = [s[0], s[1], s[2]];
        z > T::zero() && y > T::zero() && y * (z / y).logsafe() - x > T::zero()
    }

    fn is_dual_feasible(&self, z: &[T]) -> bool {
        let [u, v, w] = [z[0], z[1], z[2]];
        w > T::zero() && u < T::zero() && v - u - u * (-w / u).logsafe() > T::zero()
    }

    // f(s) = -ln((1 - ω)²/ω) - 2 ln(y) - ln(z) - 3 with
    // ω = W(1 - x/y - ln(y/z))
    fn barrier_primal(&mut self, s: &[T]) -> T {
        let [x, y, z] = [s[0], s[1], s[2]];
        let ω = wright_omega(T::one() - x / y - (y / z).logsafe());
        if !ω.is_finite() {
            return T::infinity();
        }
        let two: T = (2.).as_T();
        let three: T = (3.).as_T();
        let ωbar = (ω - T::one()) * (ω - T::one()) / ω;
        -ωbar.logsafe() - two * y.logsafe() - z.logsafe() - three
    }

    fn barrier_dual(&mut self, z: &[T]) -> T {
        let [u, v, w] = [z[0], z[1], z[2]];
        let l = (-w / u).logsafe();
        -(-w * u).logsafe() - (v - u - u * l).logsafe()
    }

    fn gradient_primal(&self, s: &[T]) -> [T; 3] {
        let [x, y, z] = [s[0], s[1], s[2]];
        let ω = wright_omega(T::one() - x / y - (y / z).logsafe());

        let g0 = ((ω - T::one()) * y).recip();
        let g1 = g0 + g0 * (ω * y / z).logsafe() - y.recip();
        let g2 = ω / ((T::one() - ω) * z);
        [g0, g1, g2]
    }

    // η = ½∇³f*(z)[u, v] with u = H⁻¹ds, written through
    // ψ(z) = z₁ ln(-z₃/z₁) - z₁ + z₂ and its derivatives
    fn higher_correction(&mut self, η: &mut [T; 3], ds: &[T], v: &[T]) {
        let mut u = [T::zero(); 3];
        if !self.data.solve_H_dual(&mut u, ds) {
            η.set(T::zero());
            return;
        }
        let [z1, _, z3] = self.data.z;
        let (v1, v3) = (v[0], v[2]);
        let (u1, u3) = (u[0], u[2]);
        let two: T = (2.).as_T();

        let ratio = -z1 / z3;
        let gψ = [ratio.logsafe(), T::one(), ratio];
        let ψ = z1 * gψ[0] - z1 + self.data.z[1];
        let ψ2inv = (ψ * ψ).recip();
        let gψu = u.dot(&gψ);
        let gψv = v.dot(&gψ);

        // uᵀ∇²ψ v, where ∇²ψ only couples the first and third entries
        let uHψv = u1 * (v1 / z1 - v3 / z3) + u3 * (z1 * v3 / z3 - v1) / z3;
        let coef = (uHψv * ψ - two * gψu * gψv) / (ψ * ψ * ψ);
        *η = gψ;
        η.scale(coef);

        let z3sq = z3 * z3;
        η[0] += (ψ.recip() - two / z1) * u1 * v1 / (z1 * z1) - u3 * v3 / z3sq / ψ
            + gψu * ψ2inv * (v1 / z1 - v3 / z3)
            + gψv * ψ2inv * (u1 / z1 - u3 / z3);
        η[2] += two * (z1 / ψ - T::one()) * u3 * v3 / (z3sq * z3)
            - (u3 * v1 + u1 * v3) / z3sq / ψ
            + gψu * ψ2inv * (z1 * v3 / z3sq - v1 / z3)
            + gψv * ψ2inv * (z1 * u3 / z3sq - u1 / z3);

        η.scale((0.5).as_T());
    }

    fn update_dual_grad_H(&mut self, z: &[T]) {
        let [u, v, w] = [z[0], z[1], z[2]];
        let l = (-w / u).logsafe();
        let r = -u * l - u + v;
        let rinv = r.recip();
        let r2 = r * r;

        self.data.grad = [rinv * l - u.recip(), -rinv, (rinv * u - T::one()) / w];

        let H = &mut self.data.H_dual;
        H[(0, 0)] = (r2 - u * r + l * l * u * u) / (r2 * u * u);
        H[(0, 1)] = -l / r2;
        H[(1, 1)] = r2.recip();
        H[(0, 2)] = (v - u) / (r2 * w);
        H[(1, 2)] = -u / (r2 * w);
        H[(2, 2)] = (r2 - u * r + u * u) / (r2 * w * w);
        H.symmetrize_from_triu();
    }
}

// Wright omega function ω(z), the solution y of y + ln(y) = z, for
// z ≥ 0.  NaN for negative z.  A series start followed by three
// fourth order Fritsch iterations, as in Serrano's thesis
// "Algorithms for unsymmetric cone optimization and an implementation
// for problems with the exponential cone", §8.4.
pub(crate) fn wright_omega<T>(z: T) -> T
where
    T: FloatT,
{
    if !(z >= T::zero()) {
        return T::nan();
    }
    let c = |x: f64| -> T { x.as_T() };

    let mut w = if z < T::one() + T::PI() {
        // Taylor series about z = 1
        let t = z - T::one();
        [1., 1. / 2., 1. / 16., -1. / 192., -1. / 3072., 13. / 61440.]
            .iter()
            .rev()
            .fold(T::zero(), |acc, &ck| acc * t + c(ck))
    } else {
        // asymptotic expansion in ln(z)/z
        let l = z.logsafe();
        let q = l / z;
        z - l + q + q / z * (l / c(2.) - T::one())
            + q / (z * z) * (l * l / c(3.) - l * c(1.5) + T::one())
    };

    let mut r = z - w - w.logsafe();
    for _ in 0..3 {
        let wp1 = w + T::one();
        let t = wp1 * (wp1 + c(2.) * r / c(3.));
        w *= T::one() + (r / wp1) * (t - r * c(0.5)) / (t - r);
        r = (c(2.) * w * w - c(8.) * w - T::one()) / (c(72.) * wp1.powi(6)) * r.powi(4);
    }
    w
}

#[test]
fn test_wright_omega() {
    for z in [1e-7, 1e-5, 1e-3, 1e-1, 1e1, 1e3, 1e5, 1e7, 1e9] {
        let y: f64 = wright_omega(z);
        assert!(((y + y.ln()) - z).abs() / z < 1e-9);
    }
    assert!(wright_omega(-1.0_f64).is_nan());
}
