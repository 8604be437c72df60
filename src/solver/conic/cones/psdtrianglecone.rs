use super::*;

/// Scaling state of a PSD cone of order `n`.  With `S = L₁L₁ᵀ`,
/// `Z = L₂L₂ᵀ` and `L₂ᵀL₁ = UΛVᵀ`, the scaling is `W x = svec(RᵀXR)`
/// where `R = L₁VΛ^{-1/2}`.
pub struct PSDConeData<T> {
    chol_s: CholeskyEngine<T>,
    chol_z: CholeskyEngine<T>,
    svd: SVDEngine<T>,
    eig: EigEngine<T>,
    // singular values of L₂ᵀL₁, the scaled point as a diagonal matrix
    λ: Vec<T>,
    λ_isqrt: Vec<T>,
    R: Matrix<T>,
    Rinv: Matrix<T>,
    Hs: Matrix<T>,

    mat: [Matrix<T>; 3],
    vec: Vec<T>,
}

impl<T> PSDConeData<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let numel = triangular_number(n);
        Self {
            chol_s: CholeskyEngine::<T>::new(n),
            chol_z: CholeskyEngine::<T>::new(n),
            svd: SVDEngine::<T>::new((n, n)),
            eig: EigEngine::<T>::new(n),
            λ: vec![T::zero(); n],
            λ_isqrt: vec![T::zero(); n],
            R: Matrix::zeros((n, n)),
            Rinv: Matrix::zeros((n, n)),
            Hs: Matrix::zeros((numel, numel)),
            mat: [
                Matrix::zeros((n, n)),
                Matrix::zeros((n, n)),
                Matrix::zeros((n, n)),
            ],
            vec: vec![T::zero(); numel],
        }
    }

    // y = α svec(RᵀXR) + βy, or α svec(RXRᵀ) + βy when transposed, with
    // R the scaling factor or its inverse
    fn congruence(&mut self, inverse: bool, shape: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        let R = if inverse { &self.Rinv } else { &self.R };
        let [X, Y, tmp] = &mut self.mat;
        svec_to_mat(X, x);
        svec_to_mat(Y, y);
        match shape {
            MatrixShape::N => {
                tmp.mul(&R.t(), X, T::one(), T::zero());
                Y.mul(tmp, R, α, β);
            }
            MatrixShape::T => {
                tmp.mul(X, &R.t(), T::one(), T::zero());
                Y.mul(R, tmp, α, β);
            }
        }
        mat_to_svec(y, Y);
    }

    // Largest α ≤ αmax with λ + α svec⁻¹(d) ⪰ 0, from the smallest
    // eigenvalue of Λ^{-1/2} D Λ^{-1/2}
    fn max_step(&mut self, d: &[T], αmax: T) -> T {
        if d.is_empty() {
            return αmax;
        }
        let D = &mut self.mat[0];
        svec_to_mat(D, d);
        D.lrscale(&self.λ_isqrt, &self.λ_isqrt);
        match self.eig.eigvals(D) {
            Ok(_) => {
                let γ = self.eig.λ.minimum();
                if γ < T::zero() {
                    T::min(-γ.recip(), αmax)
                } else {
                    αmax
                }
            }
            Err(_) => T::zero(),
        }
    }

    // log det(x + α dx), -∞ off the cone
    fn logdet_shifted(&mut self, x: &[T], dx: &[T], α: T) -> T {
        self.vec.waxpby(T::one(), x, α, dx);
        let M = &mut self.mat[0];
        svec_to_mat(M, &self.vec);
        match self.chol_s.factor(M) {
            Ok(_) => self.chol_s.logdet(),
            Err(_) => -T::infinity(),
        }
    }
}

/// The cone of positive semidefinite matrices of order `n`, stored as
/// the scaled upper triangle `svec(X)` with off diagonals times √2.
pub struct PSDTriangleCone<T> {
    n: usize,
    numel: usize,
    // boxed to keep the cone enum small
    data: Box<PSDConeData<T>>,
}

impl<T> PSDTriangleCone<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            numel: triangular_number(n),
            data: Box::new(PSDConeData::<T>::new(n)),
        }
    }

    fn diagonal(&self) -> impl Iterator<Item = usize> {
        (0..self.n).map(triangular_index)
    }
}

impl<T> Cone<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.n
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn allows_primal_dual_scaling(&self) -> bool {
        true
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    // smallest eigenvalue and the sum of the positive ones
    fn margins(&mut self, z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        if z.is_empty() {
            return (T::max_value(), T::zero());
        }
        let data = &mut *self.data;
        svec_to_mat(&mut data.mat[0], z);
        if data.eig.eigvals(&data.mat[0]).is_err() {
            return (-T::one(), T::zero());
        }
        let e = &data.eig.λ;
        let positive = e.iter().filter(|&&v| v > T::zero()).fold(T::zero(), |acc, &v| acc + v);
        (e.minimum(), positive)
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, _pd: PrimalOrDualCone) {
        for k in self.diagonal() {
            z[k] += α;
        }
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        for v in [z, s] {
            v.set(T::zero());
            self.scaled_unit_shift(v, T::one(), PrimalOrDualCone::PrimalCone);
        }
    }

    fn set_identity_scaling(&mut self) {
        let data = &mut *self.data;
        data.R.set_identity();
        data.Rinv.set_identity();
        data.Hs.set_identity();
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T, _strategy: ScalingStrategy) -> bool {
        if s.is_empty() {
            return true;
        }
        let f = &mut *self.data;
        let [S, Z, _] = &mut f.mat;
        svec_to_mat(S, s);
        svec_to_mat(Z, z);
        if f.chol_s.factor(S).is_err() || f.chol_z.factor(Z).is_err() {
            return false;
        }
        let (L1, L2) = (&f.chol_s.L, &f.chol_z.L);

        f.mat[0].mul(&L2.t(), L1, T::one(), T::zero());
        if f.svd.factor(&f.mat[0]).is_err() {
            return false;
        }
        f.λ.copy_from(&f.svd.s);
        f.λ_isqrt.copy_from(&f.λ).sqrt().recip();

        // R = L₁VΛ^{-1/2} and R⁻¹ = Λ^{-1/2}UᵀL₂ᵀ
        f.R.mul(L1, &f.svd.Vt.t(), T::one(), T::zero());
        f.R.rscale(&f.λ_isqrt);
        f.Rinv.mul(&f.svd.U.t(), &L2.t(), T::one(), T::zero());
        f.Rinv.lscale(&f.λ_isqrt);

        f.mat[0].syrk(&f.R, T::one(), T::zero());
        skron(&mut f.Hs, &f.mat[0]);

        f.R.data.is_finite() && f.Rinv.data.is_finite()
    }

    fn Hs_is_diagonal(&self) -> bool {
        false
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        self.data.Hs.pack_triu(Hsblock);
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        self.mul_W(MatrixShape::N, work, x, T::one(), T::zero());
        self.mul_W(MatrixShape::T, y, work, T::one(), T::zero());
    }

    // λ∘λ with λ diagonal
    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        ds.set(T::zero());
        for (k, &λk) in self.diagonal().zip(&self.data.λ) {
            ds[k] = λk * λk;
        }
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
        _z: &[T],
        _s: &[T],
        _settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T) {
        let data = &mut *self.data;
        let mut d = std::mem::take(&mut data.vec);

        data.congruence(false, MatrixShape::N, &mut d, dz, T::one(), T::zero());
        let αz = data.max_step(&d, αmax);
        data.congruence(true, MatrixShape::T, &mut d, ds, T::one(), T::zero());
        let αs = data.max_step(&d, αmax);

        data.vec = d;
        (αz, αs)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let data = &mut *self.data;
        -data.logdet_shifted(z, dz, α) - data.logdet_shifted(s, ds, α)
    }
}

impl<T> SymmetricCone<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    // (λ \ Z)ᵢⱼ = 2Zᵢⱼ / (λᵢ + λⱼ)
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]) {
        let data = &mut *self.data;
        let [X, Z, _] = &mut data.mat;
        svec_to_mat(Z, z);
        let two: T = (2.).as_T();
        for j in 0..self.n {
            for i in 0..self.n {
                X[(i, j)] = two * Z[(i, j)] / (data.λ[i] + data.λ[j]);
            }
        }
        mat_to_svec(x, X);
    }

    fn mul_W(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        self.data.congruence(false, is_transpose, y, x, α, β);
    }

    fn mul_Winv(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        self.data.congruence(true, is_transpose, y, x, α, β);
    }
}

impl<T> JordanAlgebra<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    // X = (YZ + ZY)/2
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        let [Y, Z, X] = &mut self.data.mat;
        svec_to_mat(Y, y);
        svec_to_mat(Z, z);
        X.syr2k(Y, Z, (0.5).as_T(), T::zero());
        mat_to_svec(x, X);
    }
}

// Upper triangle of the symmetric Kronecker product A ⊗ₛ A in svec
// coordinates.  Entry ((i,j),(k,l)) is cᵢⱼcₖₗ(AᵢₖAⱼₗ + AᵢₗAⱼₖ)/2 with
// c = √2 off the diagonal and 1 on it.
fn skron<T>(out: &mut Matrix<T>, A: &Matrix<T>)
where
    T: FloatT,
{
    let n = A.nrows();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|j| (0..=j).map(move |i| (i, j))).collect();
    let weight = |(i, j): (usize, usize)| if i == j { T::one() } else { T::SQRT_2() };
    let half: T = (0.5).as_T();

    for (col, &(k, l)) in pairs.iter().enumerate() {
        for (row, &(i, j)) in pairs.iter().enumerate().take(col + 1) {
            let sym = A[(i, k)] * A[(j, l)] + A[(i, l)] * A[(j, k)];
            out[(row, col)] = half * weight((i, j)) * weight((k, l)) * sym;
        }
    }
}
