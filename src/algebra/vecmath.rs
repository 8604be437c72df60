use super::{AsFloatT, FloatT, VectorMath};
use std::ops::Range;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        self.iter_mut().for_each(|x| *x = op(*x));
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &[T]) -> &mut Self {
        assert_eq!(self.len(), v.len());
        self.iter_mut().zip(v).for_each(|(x, &vi)| *x = op(vi));
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| c * x)
    }

    fn recip(&mut self) -> &mut Self {
        self.scalarop(T::recip)
    }

    fn sqrt(&mut self) -> &mut Self {
        self.scalarop(T::sqrt)
    }

    fn rsqrt(&mut self) -> &mut Self {
        self.scalarop(|x| x.sqrt().recip())
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), y.len());
        self.iter_mut().zip(y).for_each(|(x, &yi)| *x *= yi);
        self
    }

    fn normalize(&mut self) -> T {
        let norm = self.norm();
        if norm > T::zero() {
            self.scale(norm.recip());
        }
        norm
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        pairwise_sum(self.len(), &|i| self[i] * y[i])
    }

    fn dot_shifted(z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let n = z.len();
        assert!(s.len() == n && dz.len() == n && ds.len() == n);
        pairwise_sum(n, &|i| (z[i] + α * dz[i]) * (s[i] + α * ds[i]))
    }

    fn sum(&self) -> T {
        pairwise_sum(self.len(), &|i| self[i])
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        self.sumsq().sqrt()
    }

    fn norm_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        pairwise_sum(self.len(), &|i| {
            let p = self[i] * v[i];
            p * p
        })
        .sqrt()
    }

    // T::max drops NaNs, so they are caught separately
    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for &x in self {
            if x.is_nan() {
                return T::nan();
            }
            out = T::max(out, x.abs());
        }
        out
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        assert_eq!(self.len(), b.len());
        self.iter()
            .zip(b)
            .fold(T::zero(), |acc, (&x, &y)| T::max(acc, (x - y).abs()))
    }

    fn minimum(&self) -> T {
        self.iter().copied().fold(T::infinity(), T::min)
    }

    fn mean(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }
        let len: T = self.len().as_T();
        self.sum() / len
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        for (yi, &xi) in self.iter_mut().zip(x) {
            *yi = a * xi + b * *yi;
        }
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert!(self.len() == x.len() && self.len() == y.len());
        for (i, wi) in self.iter_mut().enumerate() {
            *wi = a * x[i] + b * y[i];
        }
        self
    }
}

// Sum of term(i) over 0..n by recursive halving, which keeps rounding
// error growth logarithmic in n.
fn pairwise_sum<T: FloatT>(n: usize, term: &impl Fn(usize) -> T) -> T {
    const LEAF: usize = 32;

    fn halve<T: FloatT>(r: Range<usize>, term: &impl Fn(usize) -> T) -> T {
        if r.len() <= LEAF {
            r.fold(T::zero(), |acc, i| acc + term(i))
        } else {
            let mid = r.start + r.len() / 2;
            halve(r.start..mid, term) + halve(mid..r.end, term)
        }
    }
    halve(0..n, term)
}
