use super::FloatT;

/// Scalar helpers for [`FloatT`](crate::algebra::FloatT) values.
pub trait ScalarMath {
    type T: FloatT;

    /// `ln(self)` for positive values, `-∞` otherwise.  Used for
    /// barrier terms that may be evaluated off the cone.
    fn logsafe(&self) -> Self::T;
}

/// In place and reducing operations on slices.  Mutating methods
/// return `self` so that they can be chained, e.g.
/// `v.copy_from(x).recip().scale(c)`.
pub trait VectorMath {
    type T;

    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// `self[i] = op(self[i])`
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;

    /// `self[i] = op(v[i])`
    fn scalarop_from(&mut self, op: impl Fn(Self::T) -> Self::T, v: &Self) -> &mut Self;

    fn set(&mut self, c: Self::T) -> &mut Self;
    fn scale(&mut self, c: Self::T) -> &mut Self;
    fn recip(&mut self) -> &mut Self;
    fn sqrt(&mut self) -> &mut Self;
    fn rsqrt(&mut self) -> &mut Self;
    fn negate(&mut self) -> &mut Self;

    /// `self[i] *= y[i]`
    fn hadamard(&mut self, y: &Self) -> &mut Self;

    /// Scale to unit 2-norm and return the old norm.  A zero vector is
    /// left alone.
    fn normalize(&mut self) -> Self::T;

    fn dot(&self, y: &Self) -> Self::T;

    /// `(z + αdz)ᵀ(s + αds)`
    fn dot_shifted(
        z: &[Self::T],
        s: &[Self::T],
        dz: &[Self::T],
        ds: &[Self::T],
        α: Self::T,
    ) -> Self::T;

    fn sum(&self) -> Self::T;
    fn sumsq(&self) -> Self::T;
    fn norm(&self) -> Self::T;

    /// `‖self ∘ v‖₂`
    fn norm_scaled(&self, v: &Self) -> Self::T;

    /// Largest magnitude, NaN if any entry is NaN.
    fn norm_inf(&self) -> Self::T;

    /// `‖self - b‖∞`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    fn minimum(&self) -> Self::T;

    /// Zero for an empty slice.
    fn mean(&self) -> Self::T;

    fn is_finite(&self) -> bool;

    /// `self = a x + b self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// `self = a x + b y`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
}

/// `y = a M x + b y`
pub trait MatrixVectorMultiply {
    type T: FloatT;

    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

/// `y = a M x + b y` for a symmetric `M` stored as its upper triangle.
pub trait SymMatrixVectorMultiply {
    type T: FloatT;

    fn symv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

/// Scaling and norm computations on matrices, mostly for equilibration.
pub trait MatrixMath {
    type T: FloatT;

    /// Infinity norm of every column.
    fn col_norms(&self, norms: &mut [Self::T]);

    /// As `col_norms`, but only raises the values already in `norms`.
    fn col_norms_no_reset(&self, norms: &mut [Self::T]);

    /// Column infinity norms of a symmetric matrix given as triu.
    fn col_norms_sym(&self, norms: &mut [Self::T]);

    /// Infinity norm of every row.
    fn row_norms(&self, norms: &mut [Self::T]);

    fn scale(&mut self, c: Self::T);
    fn negate(&mut self);

    /// `M = diag(l) M`
    fn lscale(&mut self, l: &[Self::T]);

    /// `M = M diag(r)`
    fn rscale(&mut self, r: &[Self::T]);

    /// `M = diag(l) M diag(r)`
    fn lrscale(&mut self, l: &[Self::T], r: &[Self::T]);

    /// `yᵀ M x` for a symmetric `M` given as triu.
    fn quad_form(&self, y: &[Self::T], x: &[Self::T]) -> Self::T;
}
