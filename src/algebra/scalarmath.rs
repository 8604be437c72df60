use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;

    fn logsafe(&self) -> T {
        match *self > T::zero() {
            true => self.ln(),
            false => -T::infinity(),
        }
    }
}

pub(crate) fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

// 0-based index of the k-th diagonal entry in a packed triu triangle
pub(crate) fn triangular_index(k: usize) -> usize {
    (k * (k + 3)) >> 1
}
