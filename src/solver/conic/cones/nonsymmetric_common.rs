use super::*;

/// Barrier oracle of a three dimensional nonsymmetric cone, plus the
/// `Cone` plumbing the exponential and power cones share.
pub(crate) trait Nonsymmetric3DCone<T: FloatT> {
    fn scaling(&self) -> &Nonsymmetric3DScaling<T>;
    fn scaling_mut(&mut self) -> &mut Nonsymmetric3DScaling<T>;

    fn is_primal_feasible(&self, s: &[T]) -> bool;
    fn is_dual_feasible(&self, z: &[T]) -> bool;
    fn barrier_primal(&mut self, s: &[T]) -> T;
    fn barrier_dual(&mut self, z: &[T]) -> T;

    // primal barrier gradient at s
    fn gradient_primal(&self, s: &[T]) -> [T; 3];

    // third order correction at the stored dual point along ds and v
    fn higher_correction(&mut self, η: &mut [T; 3], ds: &[T], v: &[T]);

    // refresh `grad` and `H_dual` at z
    fn update_dual_grad_H(&mut self, z: &[T]);

    fn update_scaling_3d(&mut self, s: &[T], z: &[T], μ: T, strategy: ScalingStrategy) -> bool {
        self.update_dual_grad_H(z);
        let zt = self.gradient_primal(s);
        if !zt[..].is_finite() {
            return false;
        }
        let data = self.scaling_mut();
        data.update_Hs(s, z, &zt, μ, strategy);
        data.Hs.data.is_finite()
    }

    // shift = σμ∇f*(z) - η
    fn combined_ds_shift_3d(&mut self, shift: &mut [T], step_z: &[T], step_s: &[T], σμ: T) {
        let mut η = [T::zero(); 3];
        self.higher_correction(&mut η, step_s, step_z);
        let grad = &self.scaling().grad;
        for (shi, &gi, &ηi) in itertools::izip!(shift.iter_mut(), grad, &η) {
            *shi = σμ * gi - ηi;
        }
    }

    fn step_length_3d(
        &self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T) {
        let search = |q: &[T], dq: &[T], inside: &dyn Fn(&[T]) -> bool| {
            backtrack_search(
                dq,
                q,
                αmax,
                settings.min_terminate_step_length,
                settings.linesearch_backtrack_step,
                inside,
            )
        };
        (
            search(z, dz, &|v: &[T]| self.is_dual_feasible(v)),
            search(s, ds, &|v: &[T]| self.is_primal_feasible(v)),
        )
    }

    fn compute_barrier_3d(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let shifted = |v: &[T], dv: &[T]| -> [T; 3] { std::array::from_fn(|i| v[i] + α * dv[i]) };
        self.barrier_dual(&shifted(z, dz)) + self.barrier_primal(&shifted(s, ds))
    }
}

/// Scaling state of a 3D nonsymmetric cone.
pub(crate) struct Nonsymmetric3DScaling<T> {
    // Hessian and gradient of the dual barrier at `z`
    pub H_dual: Matrix<T>,
    pub grad: [T; 3],
    // the scaling matrix, μH_dual or its primal-dual correction
    pub Hs: Matrix<T>,
    pub z: [T; 3],
    chol: CholeskyEngine<T>,
}

impl<T> Nonsymmetric3DScaling<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            H_dual: Matrix::zeros((3, 3)),
            grad: [T::zero(); 3],
            Hs: Matrix::zeros((3, 3)),
            z: [T::zero(); 3],
            chol: CholeskyEngine::new(3),
        }
    }

    pub fn update_Hs(&mut self, s: &[T], z: &[T], zt: &[T; 3], μ: T, strategy: ScalingStrategy) {
        match strategy {
            ScalingStrategy::Dual => self.dual_scaling(μ),
            ScalingStrategy::PrimalDual => self.primal_dual_scaling(s, z, zt),
        }
        self.z.copy_from_slice(z);
    }

    fn dual_scaling(&mut self, μ: T) {
        self.Hs.data.copy_from(&self.H_dual.data).scale(μ);
    }

    // Rank three update of the dual Hessian matching both s = Hs z and
    // the conjugate pair (st, zt).  Falls back to μH near the central
    // path, where the update is ill conditioned.
    fn primal_dual_scaling(&mut self, s: &[T], z: &[T], zt: &[T; 3]) {
        let three: T = (3.).as_T();
        let st = self.grad;

        let dot_sz = s.dot(z);
        let μ = dot_sz / three;
        let μt = st.dot(zt) / three;

        let δs: [T; 3] = std::array::from_fn(|i| s[i] + μ * st[i]);
        let δz: [T; 3] = std::array::from_fn(|i| z[i] + μ * zt[i]);
        let dot_δsz = δs.dot(&δz);

        let mut Hzt = [T::zero(); 3];
        self.H_dual.gemv(&mut Hzt, zt, T::one(), T::zero());
        let de1 = μ * μt - T::one();
        let de2 = zt.dot(&Hzt) - three * μt * μt;

        let well_posed = de1.abs() > T::epsilon().sqrt()
            && de2.abs() > T::epsilon()
            && dot_sz > T::zero()
            && dot_δsz > T::zero();
        if !well_posed {
            self.dual_scaling(μ);
            return;
        }

        // t = μ‖H - st stᵀ/3 - r rᵀ/de2‖_F with r = μt st - H zt
        let r: [T; 3] = std::array::from_fn(|i| μt * st[i] - Hzt[i]);
        let mut sumsq = T::zero();
        for i in 0..3 {
            for j in 0..3 {
                let e = self.H_dual[(i, j)] - st[i] * st[j] / three - r[i] * r[j] / de2;
                sumsq += e * e;
            }
        }
        let t = μ * sumsq.sqrt();

        let mut axis = [
            z[1] * zt[2] - z[2] * zt[1],
            z[2] * zt[0] - z[0] * zt[2],
            z[0] * zt[1] - z[1] * zt[0],
        ];
        axis.normalize();

        for i in 0..3 {
            for j in 0..3 {
                self.Hs[(i, j)] =
                    s[i] * s[j] / dot_sz + δs[i] * δs[j] / dot_δsz + t * axis[i] * axis[j];
            }
        }
    }

    // u = H_dual \ ds, or false if H_dual is not positive definite
    pub fn solve_H_dual(&mut self, u: &mut [T; 3], ds: &[T]) -> bool {
        if self.chol.factor(&self.H_dual).is_err() {
            return false;
        }
        u.copy_from_slice(&ds[..3]);
        self.chol.solve(&mut u[..]);
        true
    }

    pub fn get_Hs(&self, Hsblock: &mut [T]) {
        self.Hs.pack_triu(Hsblock);
    }

    pub fn mul_Hs(&self, y: &mut [T], x: &[T]) {
        self.Hs.gemv(y, x, T::one(), T::zero());
    }
}

// Largest α = α_init·stepᵏ with q + α dq inside, or zero once α
// would drop below α_min
pub(crate) fn backtrack_search<T>(
    dq: &[T],
    q: &[T],
    α_init: T,
    α_min: T,
    step: T,
    inside: &dyn Fn(&[T]) -> bool,
) -> T
where
    T: FloatT,
{
    let mut work = [T::zero(); 3];
    let mut α = α_init;
    loop {
        work.waxpby(T::one(), q, α, dq);
        if inside(&work) {
            return α;
        }
        α *= step;
        if α < α_min {
            return T::zero();
        }
    }
}

// Newton iteration for a root of f with f' = df, started left of the
// root so that steps are positive.  Stops at the first step that is
// negative or negligible.
pub(crate) fn newton_raphson_onesided<T>(x0: T, f: impl Fn(T) -> T, df: impl Fn(T) -> T) -> T
where
    T: FloatT,
{
    let ε = T::epsilon();
    let mut x = x0;
    for _ in 0..100 {
        let slope = df(x);
        let dx = -f(x) / slope;
        if dx < ε || (dx / x).abs() < ε.sqrt() || slope.abs() < ε {
            break;
        }
        x += dx;
    }
    x
}
