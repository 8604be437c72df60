use crate::algebra::FloatT;

/// Sparse vector in index/value form.
///
/// Used for right-hand sides and results of sparse triangular solves.
/// Indices are not required to be sorted, but must be unique and less
/// than `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<T = f64> {
    /// dimension of the dense vector this represents
    pub n: usize,
    /// indices of the structural nonzeros
    pub index: Vec<usize>,
    /// values at `index`
    pub values: Vec<T>,
}

impl<T> SparseVector<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            index: Vec::new(),
            values: Vec::new(),
        }
    }

    /// # Panics
    /// Panics if `index` and `values` have different lengths or an
    /// index is out of range.
    pub fn from_parts(n: usize, index: Vec<usize>, values: Vec<T>) -> Self {
        assert_eq!(index.len(), values.len());
        assert!(index.iter().all(|&i| i < n));
        Self { n, index, values }
    }

    /// Sparse copy of a dense vector, keeping the nonzero entries only
    pub fn from_dense(x: &[T]) -> Self {
        let mut out = Self::new(x.len());
        for (i, &v) in x.iter().enumerate() {
            if v != T::zero() {
                out.push(i, v);
            }
        }
        out
    }

    pub fn push(&mut self, i: usize, v: T) {
        debug_assert!(i < self.n);
        self.index.push(i);
        self.values.push(v);
    }

    /// number of stored entries
    pub fn nnz(&self) -> usize {
        self.index.len()
    }

    pub fn to_dense(&self) -> Vec<T> {
        let mut x = vec![T::zero(); self.n];
        self.scatter(&mut x);
        x
    }

    /// Adds the entries of `self` into the dense vector `x`
    pub fn scatter(&self, x: &mut [T]) {
        assert_eq!(x.len(), self.n);
        for (&i, &v) in self.index.iter().zip(self.values.iter()) {
            x[i] += v;
        }
    }

    /// Value at position `i`, zero if not stored
    pub fn get(&self, i: usize) -> T {
        self.index
            .iter()
            .position(|&k| k == i)
            .map_or(T::zero(), |p| self.values[p])
    }

    /// Inner product with a dense vector
    pub fn dot_dense(&self, x: &[T]) -> T {
        self.index
            .iter()
            .zip(self.values.iter())
            .fold(T::zero(), |acc, (&i, &v)| acc + v * x[i])
    }

    /// Sort entries by index
    pub fn sort(&mut self) {
        let mut pairs: Vec<(usize, T)> = self
            .index
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect();
        pairs.sort_by_key(|&(i, _)| i);
        self.index = pairs.iter().map(|p| p.0).collect();
        self.values = pairs.iter().map(|p| p.1).collect();
    }
}

#[test]
fn test_sparse_vector() {
    let x = [0., 2., 0., -1.];
    let mut v = SparseVector::from_dense(&x);
    assert_eq!(v.nnz(), 2);
    assert_eq!(v.get(3), -1.);
    assert_eq!(v.get(0), 0.);
    assert_eq!(v.to_dense(), x.to_vec());
    assert_eq!(v.dot_dense(&[1., 1., 1., 1.]), 1.);

    v.push(0, 5.);
    v.sort();
    assert_eq!(v.index, vec![0, 1, 3]);
}
