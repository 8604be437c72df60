use super::Matrix;
use crate::algebra::{DenseFactorizationError, FloatT};

/// Dense Cholesky factorization `A = L*L'` of a symmetric positive
/// definite matrix.  Only the lower triangle of `L` is populated.
pub struct CholeskyEngine<T> {
    /// lower triangular factor
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            L: Matrix::zeros((n, n)),
        }
    }

    /// Factor the symmetric matrix `A`, reading its upper triangle.
    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        let n = self.L.n;
        if A.m != n || A.n != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let L = &mut self.L;
        L.data.fill(T::zero());

        for j in 0..n {
            let mut d = A[(j, j)];
            for k in 0..j {
                d -= L[(j, k)] * L[(j, k)];
            }
            if !(d > T::zero()) || !d.is_finite() {
                return Err(DenseFactorizationError::Cholesky(j));
            }
            let djj = d.sqrt();
            L[(j, j)] = djj;

            for i in (j + 1)..n {
                // upper triangle entry A[j,i] == A[i,j]
                let mut v = A[(j, i)];
                for k in 0..j {
                    v -= L[(i, k)] * L[(j, k)];
                }
                L[(i, j)] = v / djj;
            }
        }
        Ok(())
    }

    /// log determinant of the factored matrix
    pub fn logdet(&self) -> T {
        let two = T::one() + T::one();
        (0..self.L.n).fold(T::zero(), |acc, i| acc + self.L[(i, i)].ln()) * two
    }

    /// Solve `A*x = b` in place using the factors
    pub fn solve(&self, b: &mut [T]) {
        let n = self.L.n;
        assert_eq!(b.len(), n);
        for i in 0..n {
            let mut v = b[i];
            for k in 0..i {
                v -= self.L[(i, k)] * b[k];
            }
            b[i] = v / self.L[(i, i)];
        }
        for i in (0..n).rev() {
            let mut v = b[i];
            for k in (i + 1)..n {
                v -= self.L[(k, i)] * b[k];
            }
            b[i] = v / self.L[(i, i)];
        }
    }
}

#[test]
fn test_cholesky() {
    let A = Matrix::<f64>::from_rows(&[&[4., 2., 0.], &[2., 5., 1.], &[0., 1., 3.]]);
    let mut chol = CholeskyEngine::<f64>::new(3);
    assert!(chol.factor(&A).is_ok());

    let mut LLt = Matrix::<f64>::zeros((3, 3));
    LLt.mul(&chol.L, &chol.L.t(), 1., 0.);
    for i in 0..9 {
        assert!((LLt.data[i] - A.data[i]).abs() < 1e-12);
    }

    let mut b: Vec<f64> = vec![2., 8., 4.];
    chol.solve(&mut b);
    let mut r = vec![0f64; 3];
    A.gemv(&mut r, &b, 1., 0.);
    assert!((r[0] - 2.).abs() < 1e-12 && (r[1] - 8.).abs() < 1e-12 && (r[2] - 4.).abs() < 1e-12);

    let detA: f64 = 4. * (5. * 3. - 1.) - 2. * (2. * 3.);
    assert!((chol.logdet() - detA.ln()).abs() < 1e-12);

    let B = Matrix::<f64>::from_rows(&[&[1., 2.], &[2., 1.]]);
    let mut chol = CholeskyEngine::<f64>::new(2);
    assert_eq!(chol.factor(&B), Err(DenseFactorizationError::Cholesky(1)));
}
