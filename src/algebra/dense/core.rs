use crate::algebra::{Adjoint, FloatT, MatrixShape, ShapedMatrix, Symmetric, VectorMath};
use std::ops::{Index, IndexMut};

/// Dense matrix in column major format
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major formmat
    pub data: Vec<T>,
}

/// Read access to dense matrices and their adjoints
pub trait DenseView: ShapedMatrix {
    type T: FloatT;
    fn get(&self, i: usize, j: usize) -> Self::T;
}

impl<T: FloatT> DenseView for Matrix<T> {
    type T = T;
    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.data[i + self.m * j]
    }
}

impl<T: FloatT> DenseView for Adjoint<'_, Matrix<T>> {
    type T = T;
    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.src.data[j + self.src.m * i]
    }
}

impl<T> ShapedMatrix for Matrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    #[inline]
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.data[idx.0 + self.m * idx.1]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        &mut self.data[idx.0 + self.m * idx.1]
    }
}

impl<T> Index<(usize, usize)> for Symmetric<'_, Matrix<T>> {
    type Output = T;
    #[inline]
    fn index(&self, idx: (usize, usize)) -> &T {
        // triu data only
        let (r, c) = if idx.0 <= idx.1 { idx } else { (idx.1, idx.0) };
        &self.src[(r, c)]
    }
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        Self {
            m,
            n,
            data: vec![T::zero(); m * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        mat.set_identity();
        mat
    }

    pub fn set_identity(&mut self) {
        assert!(self.m == self.n);
        self.data.set(T::zero());
        for i in 0..self.n {
            self[(i, i)] = T::one();
        }
    }

    /// Build from a slice of rows.  Intended for tests and small data.
    pub fn from_rows(rows: &[&[T]]) -> Self {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        let mut out = Self::zeros((m, n));
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n);
            for (j, &v) in row.iter().enumerate() {
                out[(i, j)] = v;
            }
        }
        out
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    pub fn sym(&self) -> Symmetric<'_, Self> {
        Symmetric { src: self }
    }

    /// General product `self = α*A*B + β*self`, where either
    /// of `A` or `B` may be an adjoint view
    pub fn mul<MA, MB>(&mut self, A: &MA, B: &MB, α: T, β: T) -> &mut Self
    where
        MA: DenseView<T = T>,
        MB: DenseView<T = T>,
    {
        assert_eq!(A.ncols(), B.nrows());
        assert_eq!(self.m, A.nrows());
        assert_eq!(self.n, B.ncols());

        for j in 0..self.n {
            for i in 0..self.m {
                let mut acc = T::zero();
                for k in 0..A.ncols() {
                    acc += A.get(i, k) * B.get(k, j);
                }
                let idx = i + self.m * j;
                self.data[idx] = if β == T::zero() {
                    α * acc
                } else {
                    α * acc + β * self.data[idx]
                };
            }
        }
        self
    }

    /// Dense matrix-vector product `y = α*self*x + β*y`
    pub fn gemv(&self, y: &mut [T], x: &[T], α: T, β: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);
        for (i, yi) in y.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (j, &xj) in x.iter().enumerate() {
                acc += self[(i, j)] * xj;
            }
            *yi = α * acc + if β == T::zero() { T::zero() } else { β * *yi };
        }
    }

    /// Symmetric rank k update `self = α*A*A' + β*self`.  The full
    /// matrix is written.
    pub fn syrk(&mut self, A: &Matrix<T>, α: T, β: T) -> &mut Self {
        assert_eq!(self.m, A.m);
        assert_eq!(self.n, A.m);
        self.mul(A, &A.t(), α, β)
    }

    /// Symmetric rank 2k update `self = α*(A*B' + B*A') + β*self`.
    /// The full matrix is written.
    pub fn syr2k(&mut self, A: &Matrix<T>, B: &Matrix<T>, α: T, β: T) -> &mut Self {
        assert_eq!(A.m, B.m);
        assert_eq!(A.n, B.n);
        assert_eq!(self.m, A.m);
        assert_eq!(self.n, A.m);
        let n = self.n;
        for j in 0..n {
            for i in 0..n {
                let mut acc = T::zero();
                for k in 0..A.n {
                    acc += A[(i, k)] * B[(j, k)] + B[(i, k)] * A[(j, k)];
                }
                let v = α * acc;
                self[(i, j)] = if β == T::zero() {
                    v
                } else {
                    v + β * self[(i, j)]
                };
            }
        }
        self
    }

    /// Left multiply by `Diagonal(l)`
    pub fn lscale(&mut self, l: &[T]) -> &mut Self {
        assert_eq!(l.len(), self.m);
        for j in 0..self.n {
            for (i, &li) in l.iter().enumerate() {
                self[(i, j)] *= li;
            }
        }
        self
    }

    /// Right multiply by `Diagonal(r)`
    pub fn rscale(&mut self, r: &[T]) -> &mut Self {
        assert_eq!(r.len(), self.n);
        for (j, &rj) in r.iter().enumerate() {
            self.data[j * self.m..(j + 1) * self.m].scale(rj);
        }
        self
    }

    /// `self = Diagonal(l)*self*Diagonal(r)`
    pub fn lrscale(&mut self, l: &[T], r: &[T]) -> &mut Self {
        self.lscale(l).rscale(r)
    }

    /// Copy the upper triangle into `v`, packed by columns
    pub fn pack_triu(&self, v: &mut [T]) {
        assert_eq!(self.m, self.n);
        assert_eq!(v.len(), (self.n * (self.n + 1)) / 2);
        let mut k = 0;
        for col in 0..self.n {
            for row in 0..=col {
                v[k] = self[(row, col)];
                k += 1;
            }
        }
    }

    /// Copy the upper triangle into the lower triangle
    pub fn symmetrize_from_triu(&mut self) {
        for col in 0..self.n {
            for row in 0..col {
                self[(col, row)] = self[(row, col)];
            }
        }
    }
}

/// Unpack a scaled triangle vector (triu by columns, off-diagonal
/// terms multiplied by √2) into a full symmetric matrix
pub fn svec_to_mat<T: FloatT>(M: &mut Matrix<T>, x: &[T]) {
    let mut idx = 0;
    for col in 0..M.n {
        for row in 0..=col {
            if row == col {
                M[(row, col)] = x[idx];
            } else {
                M[(row, col)] = x[idx] * T::FRAC_1_SQRT_2();
                M[(col, row)] = x[idx] * T::FRAC_1_SQRT_2();
            }
            idx += 1;
        }
    }
}

/// Pack a symmetric matrix into a scaled triangle vector.  Off
/// diagonal terms are taken as the average of the two triangles.
pub fn mat_to_svec<T: FloatT>(x: &mut [T], M: &Matrix<T>) {
    let mut idx = 0;
    let half: T = T::one() / (T::one() + T::one());
    for col in 0..M.n {
        for row in 0..=col {
            x[idx] = if row == col {
                M[(row, col)]
            } else {
                (M[(row, col)] + M[(col, row)]) * half * T::SQRT_2()
            };
            idx += 1;
        }
    }
}

#[test]
fn test_dense_mul() {
    let A = Matrix::<f64>::from_rows(&[&[1., 2.], &[3., 4.]]);
    let B = Matrix::<f64>::from_rows(&[&[0., 1.], &[1., 0.]]);
    let mut C = Matrix::<f64>::zeros((2, 2));
    C.mul(&A, &B.t(), 1., 0.);
    assert_eq!(C, Matrix::<f64>::from_rows(&[&[2., 1.], &[4., 3.]]));

    C.mul(&A.t(), &A, 1., 0.);
    assert_eq!(C, Matrix::<f64>::from_rows(&[&[10., 14.], &[14., 20.]]));

    let mut D = Matrix::<f64>::zeros((2, 2));
    D.syr2k(&A, &B, 0.5, 0.);
    let mut E = Matrix::<f64>::zeros((2, 2));
    E.mul(&A, &B.t(), 0.5, 0.);
    let mut F = Matrix::<f64>::zeros((2, 2));
    F.mul(&B, &A.t(), 0.5, 0.);
    for i in 0..4 {
        assert!((D.data[i] - E.data[i] - F.data[i]).abs() < 1e-14);
    }
}

#[test]
fn test_svec_roundtrip() {
    let x = [1., 2., 3., 4., 5., 6.];
    let mut M = Matrix::<f64>::zeros((3, 3));
    svec_to_mat(&mut M, &x);
    assert!((M[(0, 1)] - 2. / f64::sqrt(2.)).abs() < 1e-15);
    assert_eq!(M[(0, 1)], M[(1, 0)]);
    let mut y = [0.; 6];
    mat_to_svec(&mut y, &M);
    assert!(x.iter().zip(y.iter()).all(|(a, b)| (a - b).abs() < 1e-14));
}
