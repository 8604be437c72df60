use crate::algebra::*;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    // y = a A x + b y, scattering each column of A
    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!((x.len(), y.len()), (self.n, self.m));
        scale_output(y, b);
        if a == T::zero() {
            return;
        }
        for (col, &xc) in x.iter().enumerate() {
            let axc = a * xc;
            for (row, v) in self.column(col) {
                y[row] += v * axc;
            }
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    // y = a Aᵀx + b y, one column dot product per entry of y
    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert_eq!((x.len(), y.len()), (A.m, A.n));
        scale_output(y, b);
        if a == T::zero() {
            return;
        }
        for (col, yc) in y.iter_mut().enumerate() {
            let dot = A.column(col).fold(T::zero(), |acc, (row, v)| acc + v * x[row]);
            *yc += a * dot;
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    // each strictly upper entry stands for itself and its mirror
    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert!(A.is_square() && x.len() == A.n && y.len() == A.n);
        scale_output(y, b);
        for col in 0..A.n {
            for (row, v) in A.column(col) {
                y[row] += a * v * x[col];
                if row != col {
                    y[col] += a * v * x[row];
                }
            }
        }
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn negate(&mut self) {
        self.nzval.negate();
    }

    fn col_norms(&self, norms: &mut [T]) {
        norms.set(T::zero());
        self.col_norms_no_reset(norms);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        for (col, norm) in norms.iter_mut().enumerate() {
            *norm = self.column(col).fold(*norm, |m, (_, v)| T::max(m, v.abs()));
        }
    }

    fn col_norms_sym(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.set(T::zero());
        for col in 0..self.n {
            for (row, v) in self.column(col) {
                norms[col] = T::max(norms[col], v.abs());
                norms[row] = T::max(norms[row], v.abs());
            }
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.set(T::zero());
        for (&row, v) in self.rowval.iter().zip(&self.nzval) {
            norms[row] = T::max(norms[row], v.abs());
        }
    }

    fn lscale(&mut self, l: &[T]) {
        for (v, &row) in self.nzval.iter_mut().zip(&self.rowval) {
            *v *= l[row];
        }
    }

    fn rscale(&mut self, r: &[T]) {
        for (col, &rc) in r.iter().enumerate() {
            self.nzval[self.colptr[col]..self.colptr[col + 1]].scale(rc);
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        self.lscale(l);
        self.rscale(r);
    }

    // diagonal terms once, off diagonal terms from both triangles
    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        assert!(self.is_square() && x.len() == self.n && y.len() == self.n);
        let mut out = T::zero();
        for col in 0..self.n {
            for (row, v) in self.column(col) {
                debug_assert!(row <= col, "quad_form expects a triu matrix");
                out += match row == col {
                    true => v * x[col] * y[col],
                    false => v * (x[row] * y[col] + y[row] * x[col]),
                };
            }
        }
        out
    }
}

impl<T: FloatT> CscMatrix<T> {
    // (row, value) pairs of one column
    fn column(&self, col: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let (rows, vals) = self.col(col);
        rows.iter().copied().zip(vals.iter().copied())
    }
}

// the b y part of y = a A x + b y
fn scale_output<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.set(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }
}
