use super::*;

/// The power cone `{(x, y, z) : x^α y^{1-α} ≥ |z|, x, y ≥ 0}` for
/// `α ∈ (0, 1)`.
pub struct PowerCone<T: FloatT = f64> {
    α: T,
    data: Nonsymmetric3DScaling<T>,
}

impl<T> PowerCone<T>
where
    T: FloatT,
{
    pub fn new(α: T) -> Self {
        Self {
            α,
            data: Nonsymmetric3DScaling::new(),
        }
    }

    // (z₁/α)^{2α} (z₂/(1-α))^{2-2α}, the dual counterpart of x^{2α}y^{2-2α}
    fn dual_phi(&self, z: &[T]) -> T {
        let α = self.α;
        let two: T = (2.).as_T();
        (z[0] / α).powf(two * α) * (z[1] / (T::one() - α)).powf(two - two * α)
    }
}

impl<T> Cone<T> for PowerCone<T>
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

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        let two: T = (2.).as_T();
        let center = [(T::one() + self.α).sqrt(), (two - self.α).sqrt(), T::zero()];
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

impl<T> Nonsymmetric3DCone<T> for PowerCone<T>
where
    T: FloatT,
{
    fn scaling(&self) -> &Nonsymmetric3DScaling<T> {
        &self.data
    }

    fn scaling_mut(&mut self) -> &mut Nonsymmetric3DScaling<T> {
        &mut self.data
    }

    // x^{2α} y^{2-2α} > z², compared in log space
    fn is_primal_feasible(&self, s: &[T]) -> bool {
        let α = self.α;
        let two: T = (2.).as_T();
        s[0] > T::zero()
            && s[1] > T::zero()
            && T::exp(two * α * s[0].logsafe() + two * (T::one() - α) * s[1].logsafe())
                > s[2] * s[2]
    }

    fn is_dual_feasible(&self, z: &[T]) -> bool {
        let α = self.α;
        let two: T = (2.).as_T();
        let lhs = two * α * (z[0] / α).logsafe()
            + two * (T::one() - α) * (z[1] / (T::one() - α)).logsafe();
        z[0] > T::zero() && z[1] > T::zero() && T::exp(lhs) > z[2] * z[2]
    }

    // f(s) = ⟨s, g⟩ - f*(-g) at g = ∇f(s), with ⟨s, g⟩ = -3
    fn barrier_primal(&mut self, s: &[T]) -> T {
        let α = self.α;
        let three: T = (3.).as_T();
        let g = self.gradient_primal(s);
        let neg_g = [-g[0], -g[1], -g[2]];
        let arg = self.dual_phi(&neg_g) - g[2] * g[2];
        arg.logsafe() + (T::one() - α) * neg_g[0].logsafe() + α * neg_g[1].logsafe() - three
    }

    fn barrier_dual(&mut self, z: &[T]) -> T {
        let α = self.α;
        let arg = self.dual_phi(z) - z[2] * z[2];
        -arg.logsafe() - (T::one() - α) * z[0].logsafe() - α * z[1].logsafe()
    }

    // g₃ solves a scalar equation in |s₃| by Newton's method, the
    // others follow from it in closed form
    fn gradient_primal(&self, s: &[T]) -> [T; 3] {
        let α = self.α;
        let two: T = (2.).as_T();
        let (a1, a2) = (T::one() + α, two - α);

        if s[2].abs() <= T::epsilon() {
            return [-a1 / s[0], -a2 / s[1], T::zero()];
        }
        let phi = s[0].powf(two * α) * s[1].powf(two - two * α);
        let root = powcone_newton(s[2].abs(), phi, α);
        let g3 = if s[2] < T::zero() { -root } else { root };
        [
            -(α * g3 * s[2] + a1) / s[0],
            -((T::one() - α) * g3 * s[2] + a2) / s[1],
            g3,
        ]
    }

    // η = ½∇³f*(z)[u, v] with u = H⁻¹ds, through ψ(z) = φ(z) - z₃²
    fn higher_correction(&mut self, η: &mut [T; 3], ds: &[T], v: &[T]) {
        let mut u = [T::zero(); 3];
        if !self.data.solve_H_dual(&mut u, ds) {
            η.set(T::zero());
            return;
        }
        let z = self.data.z;
        let α = self.α;
        let two: T = (2.).as_T();
        let four: T = (4.).as_T();
        let β = T::one() - α;

        let phi = self.dual_phi(&z);
        let ψ = phi - z[2] * z[2];
        let ψ2inv = (ψ * ψ).recip();

        let gψ = [two * α * phi / z[0], two * β * phi / z[1], -two * z[2]];
        let mut Hψ = Matrix::zeros((3, 3));
        Hψ[(0, 0)] = two * α * (two * α - T::one()) * phi / (z[0] * z[0]);
        Hψ[(0, 1)] = four * α * β * phi / (z[0] * z[1]);
        Hψ[(1, 1)] = two * β * (T::one() - two * α) * phi / (z[1] * z[1]);
        Hψ[(2, 2)] = -two;
        Hψ.symmetrize_from_triu();

        let gψu = u.dot(&gψ);
        let gψv = v.dot(&gψ);
        let mut Hψv = [T::zero(); 3];
        Hψ.gemv(&mut Hψv, &v[..3], T::one(), T::zero());
        let mut Hψu = [T::zero(); 3];
        Hψ.gemv(&mut Hψu, &u, T::one(), T::zero());

        let coef = (u.dot(&Hψv) * ψ - two * gψu * gψv) / (ψ * ψ * ψ);
        let cross = four * α * (two * α - T::one()) * β * phi
            * (u[0] / z[0] - u[1] / z[1])
            * (v[0] / z[0] - v[1] / z[1])
            / ψ;

        let cube = |x: T| x * x * x;
        η[0] = coef * gψ[0] - two * β * u[0] * v[0] / cube(z[0]) + cross / z[0];
        η[1] = coef * gψ[1] - two * α * u[1] * v[1] / cube(z[1]) - cross / z[1];
        η[2] = coef * gψ[2];
        for i in 0..3 {
            η[i] += (Hψv[i] * gψu + Hψu[i] * gψv) * ψ2inv;
        }
        η.scale((0.5).as_T());
    }

    fn update_dual_grad_H(&mut self, z: &[T]) {
        let α = self.α;
        let β = T::one() - α;
        let two: T = (2.).as_T();
        let four: T = (4.).as_T();

        let phi = self.dual_phi(z);
        let ψ = phi - z[2] * z[2];
        // ∇ψ/ψ
        let g = [
            two * α * phi / (z[0] * ψ),
            two * β * phi / (z[1] * ψ),
            -two * z[2] / ψ,
        ];

        let H = &mut self.data.H_dual;
        H[(0, 0)] = g[0] * g[0] - two * α * (two * α - T::one()) * phi / (z[0] * z[0] * ψ)
            + β / (z[0] * z[0]);
        H[(0, 1)] = g[0] * g[1] - four * α * β * phi / (z[0] * z[1] * ψ);
        H[(1, 1)] = g[1] * g[1] - two * β * (T::one() - two * α) * phi / (z[1] * z[1] * ψ)
            + α / (z[1] * z[1]);
        H[(0, 2)] = g[0] * g[2];
        H[(1, 2)] = g[1] * g[2];
        H[(2, 2)] = g[2] * g[2] + two / ψ;
        H.symmetrize_from_triu();

        self.data.grad = [-g[0] - β / z[0], -g[1] - α / z[1], -g[2]];
    }
}

// Root x > 0 of the scalar optimality condition for the third primal
// gradient entry, given |s₃| and φ = s₁^{2α} s₂^{2-2α}
fn powcone_newton<T>(s3: T, phi: T, α: T) -> T
where
    T: FloatT,
{
    let two: T = (2.).as_T();
    let three: T = (3.).as_T();
    let four: T = (4.).as_T();
    let β = T::one() - α;

    // lies to the left of the root
    let x0 = -s3.recip()
        + two * (s3 + (four * phi * phi / (s3 * s3) + three * phi).sqrt()) / (four * phi - s3 * s3);

    let offset = -two * α * α.logsafe() - two * β * β.logsafe();

    let f = |x: T| {
        let (t1, t2) = (x * x, two * x / s3);
        two * α * (two * α * t1 + (T::one() + α) * t2).logsafe()
            + two * β * (two * β * t1 + (two - α) * t2).logsafe()
            - phi.logsafe()
            - (t1 + t2).logsafe()
            - two * t2.logsafe()
            + offset
    };
    let df = |x: T| {
        two * α * α / (α * x + (T::one() + α) / s3)
            + two * β * β / (β * x + (two - α) / s3)
            - two * (x + s3.recip()) / (x * x + two * x / s3)
    };
    newton_raphson_onesided(x0, f, df)
}
