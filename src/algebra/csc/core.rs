#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric};
use std::iter::zip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use conicopt::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Responsibility for ensuring these conditions hold
    /// is left to the caller.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// An `m x n` matrix with no structural nonzeros
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        Self::spalloc(m, n, 0)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// Build a matrix from (row, col, value) triplets.  Duplicate
    /// entries are summed and entries within each column are sorted.
    /// Explicit zeros are kept as structural nonzeros.
    ///
    /// # Panics
    /// Panics if the triplet arrays have different lengths or an index
    /// is out of bounds.
    pub fn new_from_triplets(m: usize, n: usize, I: &[usize], J: &[usize], V: &[T]) -> Self {
        assert_eq!(I.len(), J.len());
        assert_eq!(I.len(), V.len());

        // counting sort by column, then by row within each column
        let mut colcount = vec![0usize; n + 1];
        for &j in J {
            assert!(j < n);
            colcount[j + 1] += 1;
        }
        for j in 0..n {
            colcount[j + 1] += colcount[j];
        }
        let mut next = colcount.clone();
        let mut order = vec![0usize; I.len()];
        for (k, &j) in J.iter().enumerate() {
            order[next[j]] = k;
            next[j] += 1;
        }

        let mut colptr = vec![0usize; n + 1];
        let mut rowval = Vec::with_capacity(I.len());
        let mut nzval = Vec::with_capacity(I.len());
        let mut buf: Vec<(usize, T)> = Vec::new();

        for j in 0..n {
            buf.clear();
            for &k in &order[colcount[j]..colcount[j + 1]] {
                assert!(I[k] < m);
                buf.push((I[k], V[k]));
            }
            buf.sort_by_key(|&(r, _)| r);
            for &(r, v) in buf.iter() {
                if rowval.len() > colptr[j] && rowval.last() == Some(&r) {
                    if let Some(last) = nzval.last_mut() {
                        *last += v;
                    }
                } else {
                    rowval.push(r);
                    nzval.push(v);
                }
            }
            colptr[j + 1] = rowval.len();
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Build a sparse matrix from a dense row-major array of rows.
    /// Zero entries are dropped.
    pub fn from_dense_rows(rows: &[Vec<T>]) -> Self {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        let (mut I, mut J, mut V) = (vec![], vec![], vec![]);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n);
            for (j, &v) in row.iter().enumerate() {
                if v != T::zero() {
                    I.push(i);
                    J.push(j);
                    V.push(v);
                }
            }
        }
        Self::new_from_triplets(m, n, &I, &J, &V)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Materialized transpose in CSC format
    pub fn transpose(&self) -> Self {
        let mut colptr = vec![0usize; self.m + 1];
        for &r in &self.rowval {
            colptr[r + 1] += 1;
        }
        for i in 0..self.m {
            colptr[i + 1] += colptr[i];
        }
        let mut next = colptr.clone();
        let nnz = self.nnz();
        let mut rowval = vec![0usize; nnz];
        let mut nzval = vec![T::zero(); nnz];

        for col in 0..self.n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[ptr];
                let dest = next[row];
                rowval[dest] = col;
                nzval[dest] = self.nzval[ptr];
                next[row] += 1;
            }
        }
        CscMatrix::new(self.n, self.m, colptr, rowval, nzval)
    }

    /// row indices and values of column `col`
    pub fn col(&self, col: usize) -> (&[usize], &[T]) {
        let rng = self.colptr[col]..self.colptr[col + 1];
        (&self.rowval[rng.clone()], &self.nzval[rng])
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Select a subset of the rows of a sparse matrix
    ///
    /// # Panics
    /// Panics if row dimensions are incompatible
    pub fn select_rows(&self, rowidx: &[bool]) -> Self {
        assert_eq!(rowidx.len(), self.m);

        //index from the logical rowidx to the reduced row number
        let mut rridx = vec![0; self.m];
        let mut mred = 0;
        for (r, is_used) in zip(&mut rridx, rowidx) {
            if *is_used {
                *r = mred;
                mred += 1;
            }
        }

        let nzred = self.rowval.iter().filter(|&r| rowidx[*r]).count();
        let mut Ared = CscMatrix::spalloc(mred, self.n, nzred);

        let mut ptrred = 0;
        for col in 0..self.n {
            Ared.colptr[col] = ptrred;
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let thisrow = self.rowval[ptr];
                if rowidx[thisrow] {
                    Ared.rowval[ptrred] = rridx[thisrow];
                    Ared.nzval[ptrred] = self.nzval[ptr];
                    ptrred += 1;
                }
            }
        }
        Ared.colptr[Ared.n] = ptrred;

        Ared
    }

    /// Select a subset of columns of a sparse matrix, in the given order
    pub fn select_columns(&self, cols: &[usize]) -> Self {
        let nnz = cols
            .iter()
            .map(|&c| self.colptr[c + 1] - self.colptr[c])
            .sum();
        let mut colptr = Vec::with_capacity(cols.len() + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        colptr.push(0);
        for &c in cols {
            let (rows, vals) = self.col(c);
            rowval.extend_from_slice(rows);
            nzval.extend_from_slice(vals);
            colptr.push(rowval.len());
        }
        CscMatrix::new(self.m, cols.len(), colptr, rowval, nzval)
    }

    /// Allocates a new matrix containing only entries from the upper triangular part
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let n = self.n;
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        //NB: assumes monotonically increasing row numbers in each column
        for col in 0..n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                if self.rowval[ptr] <= col {
                    rowval.push(self.rowval[ptr]);
                    nzval.push(self.nzval[ptr]);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        (0..self.n).all(|col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .all(|&row| row <= col)
        })
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        match rows_in_this_column.binary_search(&row) {
            Ok(idx) => Some(self.nzval[first + idx]),
            Err(_) => None,
        }
    }

    /// Dense copy, column major.  Intended for small matrices and tests.
    pub fn to_dense(&self) -> Vec<Vec<T>> {
        let mut out = vec![vec![T::zero(); self.n]; self.m];
        for col in 0..self.n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                out[self.rowval[ptr]][col] += self.nzval[ptr];
            }
        }
        out
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
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

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::new(
        6,
        5,
        vec![0, 3, 9, 11, 11, 14],
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.],
    );

    assert_eq!(A.get_entry((1, 0)).unwrap(), 1.);
    assert_eq!(A.get_entry((5, 0)).unwrap(), 3.);
    assert_eq!(A.get_entry((3, 1)).unwrap(), 7.);
    assert_eq!(A.get_entry((4, 4)).unwrap(), 14.);
    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((1, 3)).is_none());

    let At = A.transpose();
    assert!(At.check_format().is_ok());
    assert_eq!(At.get_entry((1, 0)).unwrap(), 4.);
    assert_eq!(At.get_entry((4, 2)).unwrap(), 13.);
    assert_eq!(At.transpose(), A);
}

#[test]
fn test_csc_from_triplets() {
    let I = [2, 0, 0, 1, 0];
    let J = [0, 1, 0, 1, 1];
    let V = [3., 1., 2., 4., 5.];
    let A = CscMatrix::new_from_triplets(3, 2, &I, &J, &V);
    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 2, 4]);
    assert_eq!(A.rowval, vec![0, 2, 0, 1]);
    assert_eq!(A.nzval, vec![2., 3., 6., 4.]);
}
