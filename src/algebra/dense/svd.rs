use super::Matrix;
use crate::algebra::{AsFloatT, DenseFactorizationError, FloatT};

/// Singular value decomposition `A = U*diag(s)*Vt` of a square matrix
/// by one-sided Jacobi (Hestenes) orthogonalization.
pub struct SVDEngine<T> {
    /// left singular vectors
    pub U: Matrix<T>,
    /// singular values, unordered
    pub s: Vec<T>,
    /// right singular vectors, transposed
    pub Vt: Matrix<T>,
    V: Matrix<T>,
}

const SVD_MAX_SWEEPS: usize = 64;

impl<T> SVDEngine<T>
where
    T: FloatT,
{
    pub fn new(size: (usize, usize)) -> Self {
        let (m, n) = size;
        assert_eq!(m, n);
        Self {
            U: Matrix::zeros((n, n)),
            s: vec![T::zero(); n],
            Vt: Matrix::zeros((n, n)),
            V: Matrix::zeros((n, n)),
        }
    }

    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        let n = self.s.len();
        if A.m != n || A.n != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        // U holds the working copy of A*V
        let U = &mut self.U;
        U.data.copy_from_slice(&A.data);
        self.V.set_identity();

        let tol = T::epsilon() * n.as_T();
        let mut converged = n < 2;
        let mut sweep = 0;

        while !converged && sweep < SVD_MAX_SWEEPS {
            sweep += 1;
            converged = true;
            for p in 0..n {
                for q in (p + 1)..n {
                    let (mut α, mut β, mut γ) = (T::zero(), T::zero(), T::zero());
                    for k in 0..n {
                        α += U[(k, p)] * U[(k, p)];
                        β += U[(k, q)] * U[(k, q)];
                        γ += U[(k, p)] * U[(k, q)];
                    }
                    if γ.abs() <= tol * (α * β).sqrt() || γ == T::zero() {
                        continue;
                    }
                    converged = false;

                    let two = T::one() + T::one();
                    let ζ = (β - α) / (two * γ);
                    let t = ζ.signum() / (ζ.abs() + (T::one() + ζ * ζ).sqrt());
                    let c = (T::one() + t * t).sqrt().recip();
                    let s = c * t;

                    for k in 0..n {
                        let ukp = U[(k, p)];
                        let ukq = U[(k, q)];
                        U[(k, p)] = c * ukp - s * ukq;
                        U[(k, q)] = s * ukp + c * ukq;

                        let vkp = self.V[(k, p)];
                        let vkq = self.V[(k, q)];
                        self.V[(k, p)] = c * vkp - s * vkq;
                        self.V[(k, q)] = s * vkp + c * vkq;
                    }
                }
            }
        }

        if !converged {
            return Err(DenseFactorizationError::SVD);
        }

        // singular values are the column norms of A*V
        for j in 0..n {
            let σ = (0..n).fold(T::zero(), |acc, k| acc + U[(k, j)] * U[(k, j)]).sqrt();
            self.s[j] = σ;
            if σ > T::zero() {
                for k in 0..n {
                    U[(k, j)] /= σ;
                }
            }
        }
        for i in 0..n {
            for j in 0..n {
                self.Vt[(i, j)] = self.V[(j, i)];
            }
        }
        Ok(())
    }
}

#[test]
fn test_svd() {
    let A = Matrix::<f64>::from_rows(&[&[3., 1., 0.], &[1., 2., 1.], &[0., -1., 4.]]);
    let mut svd = SVDEngine::<f64>::new((3, 3));
    svd.factor(&A).unwrap();

    // U*diag(s)*Vt == A
    let mut Us = svd.U.clone();
    Us.rscale(&svd.s);
    let mut B = Matrix::<f64>::zeros((3, 3));
    B.mul(&Us, &svd.Vt, 1., 0.);
    for i in 0..9 {
        assert!((B.data[i] - A.data[i]).abs() < 1e-10);
    }

    // U orthogonal
    let mut UtU = Matrix::<f64>::zeros((3, 3));
    UtU.mul(&svd.U.t(), &svd.U, 1., 0.);
    for i in 0..3 {
        for j in 0..3 {
            let e = if i == j { 1. } else { 0. };
            assert!((UtU[(i, j)] - e).abs() < 1e-10);
        }
    }
}
