use super::Matrix;
use crate::algebra::{DenseFactorizationError, FloatT};

/// Symmetric eigendecomposition by cyclic Jacobi rotations.
///
/// Small symmetric matrices only.  Eigenvalues are returned in
/// ascending order in `λ`, with eigenvectors (if requested) in the
/// columns of `V`.
pub struct EigEngine<T> {
    /// eigenvalues in ascending order
    pub λ: Vec<T>,
    /// eigenvectors, as columns
    pub V: Matrix<T>,
    work: Matrix<T>,
}

const JACOBI_MAX_SWEEPS: usize = 64;

impl<T> EigEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            λ: vec![T::zero(); n],
            V: Matrix::zeros((n, n)),
            work: Matrix::zeros((n, n)),
        }
    }

    /// Eigenvalues only.  Reads the full matrix, which must be symmetric.
    pub fn eigvals(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.compute(A, false)
    }

    /// Eigenvalues and eigenvectors
    pub fn eigen(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.compute(A, true)
    }

    fn compute(&mut self, A: &Matrix<T>, vectors: bool) -> Result<(), DenseFactorizationError> {
        let n = self.λ.len();
        if A.m != n || A.n != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let W = &mut self.work;
        W.data.copy_from_slice(&A.data);
        if vectors {
            self.V.set_identity();
        }

        let two = T::one() + T::one();
        let scale = W.data.iter().fold(T::zero(), |m, &x| T::max(m, x.abs()));
        let tol = T::epsilon() * scale;

        let mut converged = n < 2 || scale == T::zero();
        let mut sweep = 0;
        while !converged && sweep < JACOBI_MAX_SWEEPS {
            sweep += 1;
            let mut offmax = T::zero();
            for p in 0..n {
                for q in (p + 1)..n {
                    offmax = T::max(offmax, W[(p, q)].abs());
                }
            }
            if offmax <= tol {
                converged = true;
                break;
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let apq = W[(p, q)];
                    if apq.abs() <= tol {
                        continue;
                    }
                    let app = W[(p, p)];
                    let aqq = W[(q, q)];
                    let θ = (aqq - app) / (two * apq);
                    let t = θ.signum() / (θ.abs() + (θ * θ + T::one()).sqrt());
                    let c = (t * t + T::one()).sqrt().recip();
                    let s = t * c;

                    // W = J' * W * J, rotating rows/cols p and q
                    for k in 0..n {
                        let wkp = W[(k, p)];
                        let wkq = W[(k, q)];
                        W[(k, p)] = c * wkp - s * wkq;
                        W[(k, q)] = s * wkp + c * wkq;
                    }
                    for k in 0..n {
                        let wpk = W[(p, k)];
                        let wqk = W[(q, k)];
                        W[(p, k)] = c * wpk - s * wqk;
                        W[(q, k)] = s * wpk + c * wqk;
                    }
                    W[(p, q)] = T::zero();
                    W[(q, p)] = T::zero();

                    if vectors {
                        for k in 0..n {
                            let vkp = self.V[(k, p)];
                            let vkq = self.V[(k, q)];
                            self.V[(k, p)] = c * vkp - s * vkq;
                            self.V[(k, q)] = s * vkp + c * vkq;
                        }
                    }
                }
            }
        }

        if !converged {
            return Err(DenseFactorizationError::Eigen);
        }

        // sort ascending, permuting eigenvectors to match
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            W[(a, a)]
                .partial_cmp(&W[(b, b)])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (k, &i) in order.iter().enumerate() {
            self.λ[k] = W[(i, i)];
        }
        if vectors {
            let Vold = self.V.clone();
            for (k, &i) in order.iter().enumerate() {
                for r in 0..n {
                    self.V[(r, k)] = Vold[(r, i)];
                }
            }
        }
        Ok(())
    }
}

#[test]
fn test_eigen() {
    let A = Matrix::<f64>::from_rows(&[&[2., 1., 0.], &[1., 2., 0.], &[0., 0., 5.]]);
    let mut eng = EigEngine::<f64>::new(3);
    eng.eigen(&A).unwrap();
    let expected = [1., 3., 5.];
    for i in 0..3 {
        assert!((eng.λ[i] - expected[i]).abs() < 1e-12);
    }
    // A*v = λ*v
    for k in 0..3 {
        let v: Vec<f64> = (0..3).map(|r| eng.V[(r, k)]).collect();
        let mut Av = vec![0f64; 3];
        A.gemv(&mut Av, &v, 1., 0.);
        for r in 0..3 {
            assert!((Av[r] - eng.λ[k] * v[r]).abs() < 1e-10);
        }
    }
}
