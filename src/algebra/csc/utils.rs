// Counting and filling of block partitioned sparse matrices.  A
// matrix is assembled in two sweeps: first `colptr` accumulates the
// column counts of every block, then `colcount_to_colptr` turns the
// counts into start positions that the `fill_*` functions advance as
// the next free slot of each column.  `backshift_colptrs` restores a
// valid `colptr` at the end.

use crate::algebra::{CscMatrix, FloatT, MatrixShape, MatrixTriangle};
use std::iter::zip;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // true if column `i` of a square triu matrix has no diagonal entry
    fn missing_diag(&self, i: usize) -> bool {
        let (start, stop) = (self.colptr[i], self.colptr[i + 1]);
        start == stop || self.rowval[stop - 1] != i
    }

    /// Number of structurally present diagonal entries of a square
    /// triu matrix
    pub(crate) fn count_diagonal_entries(&self) -> usize {
        (0..self.n).filter(|&i| !self.missing_diag(i)).count()
    }

    pub(crate) fn colcount_block(&mut self, M: &CscMatrix<T>, initcol: usize, shape: MatrixShape) {
        match shape {
            MatrixShape::T => {
                for &row in M.rowval.iter() {
                    self.colptr[initcol + row] += 1;
                }
            }
            MatrixShape::N => {
                for (c, w) in self.colptr[initcol..initcol + M.n].iter_mut().zip(M.colptr.windows(2)) {
                    *c += w[1] - w[0];
                }
            }
        }
    }

    // one entry for every missing diagonal of the triu matrix M
    pub(crate) fn colcount_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        debug_assert!(self.colptr.len() >= M.n + initcol);
        for i in 0..M.n {
            if M.missing_diag(i) {
                self.colptr[initcol + i] += 1;
            }
        }
    }

    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        self.colptr[initcol..initcol + blockcols]
            .iter_mut()
            .for_each(|c| *c += 1);
    }

    pub(crate) fn colcount_dense_triangle(
        &mut self,
        initcol: usize,
        blockcols: usize,
        shape: MatrixTriangle,
    ) {
        let cols = self.colptr[initcol..initcol + blockcols].iter_mut();
        let counts = 1..=blockcols;
        match shape {
            MatrixTriangle::Triu => zip(cols, counts).for_each(|(c, k)| *c += k),
            MatrixTriangle::Tril => zip(cols, counts.rev()).for_each(|(c, k)| *c += k),
        }
    }

    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut next = 0;
        for p in self.colptr.iter_mut() {
            let count = *p;
            *p = next;
            next += count;
        }
    }

    /// Copy M (or Mᵀ) with its top left corner at (`initrow`,
    /// `initcol`).  `MtoKKT[p]` receives the destination of the p-th
    /// nonzero of M.
    pub(crate) fn fill_block(
        &mut self,
        M: &CscMatrix<T>,
        MtoKKT: &mut [usize],
        initrow: usize,
        initcol: usize,
        shape: MatrixShape,
    ) {
        for j in 0..M.n {
            for p in M.colptr[j]..M.colptr[j + 1] {
                let (row, col) = match shape {
                    MatrixShape::N => (M.rowval[p] + initrow, j + initcol),
                    MatrixShape::T => (j + initrow, M.rowval[p] + initcol),
                };
                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = M.nzval[p];
                self.colptr[col] += 1;
                MtoKKT[p] = dest;
            }
        }
    }

    // structural zeros where the triu matrix M has no diagonal
    pub(crate) fn fill_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            if M.missing_diag(i) {
                let col = i + initcol;
                let dest = self.colptr[col];
                self.rowval[dest] = col;
                self.nzval[dest] = T::zero();
                self.colptr[col] += 1;
            }
        }
    }

    pub(crate) fn fill_diag(&mut self, diagtoKKT: &mut [usize], offset: usize, blockdim: usize) {
        for (d, col) in zip(diagtoKKT.iter_mut(), offset..offset + blockdim) {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = T::zero();
            self.colptr[col] += 1;
            *d = dest;
        }
    }

    /// Structural zeros over a dense triangle on the diagonal.
    /// `blocktoKKT` is ordered as the packed triu of the block in
    /// either case.
    pub(crate) fn fill_dense_triangle(
        &mut self,
        blocktoKKT: &mut [usize],
        offset: usize,
        blockdim: usize,
        shape: MatrixTriangle,
    ) {
        let mut k = 0;
        for outer in offset..offset + blockdim {
            for inner in offset..=outer {
                // packed triu order is (inner, outer) column by column
                let (row, col) = match shape {
                    MatrixTriangle::Triu => (inner, outer),
                    MatrixTriangle::Tril => (outer, inner),
                };
                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = T::zero();
                self.colptr[col] += 1;
                blocktoKKT[k] = dest;
                k += 1;
            }
        }
    }

    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

#[test]
fn test_block_fill() {
    // [I  Bᵀ] with B = [1 2], assembled as triu
    let I = CscMatrix::<f64>::identity(2);
    let B = CscMatrix::<f64>::from_dense_rows(&[vec![1., 2.]]);

    let mut K = CscMatrix::<f64>::spalloc(3, 3, 5);
    K.colptr.fill(0);
    K.colcount_block(&I, 0, MatrixShape::N);
    K.colcount_block(&B, 2, MatrixShape::T);
    K.colcount_diag(2, 1);
    assert_eq!(K.colptr, vec![1, 1, 3, 0]);

    K.colcount_to_colptr();
    let mut Imap = vec![0; 2];
    let mut Bmap = vec![0; 2];
    let mut Dmap = vec![0; 1];
    K.fill_block(&I, &mut Imap, 0, 0, MatrixShape::N);
    K.fill_block(&B, &mut Bmap, 0, 2, MatrixShape::T);
    K.fill_diag(&mut Dmap, 2, 1);
    K.backshift_colptrs();

    assert!(K.check_format().is_ok());
    assert_eq!(K.colptr, vec![0, 1, 2, 5]);
    assert_eq!(Imap, vec![0, 1]);
    assert_eq!(Bmap, vec![2, 3]);
    assert_eq!(Dmap, vec![4]);
    assert_eq!(K.nzval, vec![1., 1., 1., 2., 0.]);
}

#[test]
fn test_missing_diag_and_triangles() {
    let M = CscMatrix::<f64>::from_dense_rows(&[
        vec![1., 2., 0.], //
        vec![0., 0., 0.], //
        vec![0., 0., 3.], //
    ]);
    assert_eq!(M.count_diagonal_entries(), 2);

    // tril fill stores the packed triu positions transposed
    let mut K = CscMatrix::<f64>::spalloc(2, 2, 3);
    K.colptr.fill(0);
    K.colcount_dense_triangle(0, 2, MatrixTriangle::Tril);
    assert_eq!(&K.colptr[0..2], &[2, 1]);
    K.colcount_to_colptr();
    let mut map = vec![0; 3];
    K.fill_dense_triangle(&mut map, 0, 2, MatrixTriangle::Tril);
    K.backshift_colptrs();
    assert_eq!(K.rowval, vec![0, 1, 1]);
    assert_eq!(map, vec![0, 1, 2]);
}
