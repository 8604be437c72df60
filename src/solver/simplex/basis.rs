#![allow(non_snake_case)]
use crate::algebra::*;
use crate::lu::{LuError, LuSettings, SparseLU};

/// Column `k` of the matrix `[A -I]`, i.e. a structural column for
/// `k < A.n` and the negated unit vector of row `k - A.n` otherwise
pub(crate) fn column_of<T: FloatT>(A: &CscMatrix<T>, k: usize) -> (Vec<usize>, Vec<T>) {
    if k < A.n {
        let (rows, vals) = A.col(k);
        (rows.to_vec(), vals.to_vec())
    } else {
        (vec![k - A.n], vec![-T::one()])
    }
}

/// Basis matrix `B = [A -I][:, head]`
pub(crate) fn basis_matrix<T: FloatT>(A: &CscMatrix<T>, head: &[usize]) -> CscMatrix<T> {
    let m = head.len();
    let mut colptr = Vec::with_capacity(m + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    colptr.push(0);
    for &k in head {
        if k < A.n {
            let (rows, vals) = A.col(k);
            rowval.extend_from_slice(rows);
            nzval.extend_from_slice(vals);
        } else {
            rowval.push(k - A.n);
            nzval.push(-T::one());
        }
        colptr.push(rowval.len());
    }
    CscMatrix::new(m, m, colptr, rowval, nzval)
}

// elementary column transformation I + (w - e_p)e_pᵀ
#[derive(Debug, Clone)]
struct Eta<T> {
    p: usize,
    wp: T,
    index: Vec<usize>,
    values: Vec<T>,
}

/// LU factors of a simplex basis plus a product form update file.
///
/// With `B₀ = LU` and etas `E₁ … Eₖ`, the current basis is
/// `B₀ E₁ ⋯ Eₖ`.
#[derive(Debug, Clone)]
pub(crate) struct BasisFactor<T: FloatT> {
    m: usize,
    lu: SparseLU<T>,
    etas: Vec<Eta<T>>,
}

/// Result of a factorization with repair
pub(crate) struct RepairedFactor<T: FloatT> {
    pub factor: BasisFactor<T>,
    /// variables dropped from the basis, replaced by logicals
    pub dropped: Vec<usize>,
}

impl<T> BasisFactor<T>
where
    T: FloatT,
{
    /// Factor `[A -I][:, head]`, failing on a singular basis
    pub fn new(A: &CscMatrix<T>, head: &[usize], settings: &LuSettings<T>) -> Result<Self, LuError> {
        let B = basis_matrix(A, head);
        let lu = SparseLU::factor(&B, settings)?;
        Ok(Self {
            m: head.len(),
            lu,
            etas: Vec::new(),
        })
    }

    /// Factor `[A -I][:, head]`.  Columns without an acceptable pivot are
    /// replaced in `head` by the logical of an unpivoted row until the
    /// basis is nonsingular.
    pub fn new_with_repair(
        A: &CscMatrix<T>,
        head: &mut [usize],
        settings: &LuSettings<T>,
    ) -> Result<RepairedFactor<T>, LuError> {
        let n = A.n;
        let mut dropped = Vec::new();

        for _ in 0..=head.len() {
            match Self::new(A, head, settings) {
                Ok(factor) => return Ok(RepairedFactor { factor, dropped }),
                Err(LuError::DegenerateMatrix {
                    column,
                    unpivoted_rows,
                }) => {
                    let replacement = unpivoted_rows
                        .iter()
                        .map(|&i| n + i)
                        .find(|k| !head.contains(k));
                    match replacement {
                        Some(k) => {
                            log::debug!("basis repair: column {} -> logical {}", head[column], k - n);
                            dropped.push(head[column]);
                            head[column] = k;
                        }
                        None => {
                            return Err(LuError::DegenerateMatrix {
                                column,
                                unpivoted_rows,
                            })
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(LuError::Ordering)
    }

    /// number of updates since the last factorization
    pub fn num_updates(&self) -> usize {
        self.etas.len()
    }

    /// Replace basis column `p` by a column `a` with `w = B⁻¹a`
    pub fn update(&mut self, p: usize, w: &[T]) {
        assert_eq!(w.len(), self.m);
        let mut eta = Eta {
            p,
            wp: w[p],
            index: Vec::new(),
            values: Vec::new(),
        };
        for (i, &wi) in w.iter().enumerate() {
            if i != p && wi != T::zero() {
                eta.index.push(i);
                eta.values.push(wi);
            }
        }
        self.etas.push(eta);
    }

    /// Solves `Bx = b` in place
    pub fn solve(&mut self, b: &mut [T]) {
        self.lu.solve(b);
        for eta in &self.etas {
            let xp = b[eta.p] / eta.wp;
            b[eta.p] = xp;
            for (&i, &wi) in eta.index.iter().zip(&eta.values) {
                b[i] -= wi * xp;
            }
        }
    }

    /// Solves `Bᵀx = b` in place
    pub fn solve_transpose(&mut self, b: &mut [T]) {
        for eta in self.etas.iter().rev() {
            let mut s = b[eta.p];
            for (&i, &wi) in eta.index.iter().zip(&eta.values) {
                s -= wi * b[i];
            }
            b[eta.p] = s / eta.wp;
        }
        self.lu.solve_transpose(b);
    }

    /// Sparse solve with `B` or `Bᵀ`.  Uses the sparse triangular
    /// solves of the LU factors when no updates are pending.
    pub fn solve_sparse(&mut self, b: &SparseVector<T>, transpose: bool) -> SparseVector<T> {
        if self.etas.is_empty() {
            let mut x = self.lu.solve_sparse(b, transpose);
            x.sort();
            x
        } else {
            let mut x = b.to_dense();
            if transpose {
                self.solve_transpose(&mut x);
            } else {
                self.solve(&mut x);
            }
            SparseVector::from_dense(&x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_mul(A: &CscMatrix<f64>, head: &[usize], x: &[f64]) -> Vec<f64> {
        let B = basis_matrix(A, head);
        let mut y = vec![0.; head.len()];
        B.gemv(&mut y, x, 1., 0.);
        y
    }

    #[test]
    fn test_eta_updates_match_refactor() {
        let A = CscMatrix::from_dense_rows(&[vec![2., 1., 0.], vec![1., 3., 1.], vec![0., 1., 4.]]);
        let settings = LuSettings::default();

        // slack basis, then bring in structurals one at a time
        let mut head = vec![3, 4, 5];
        let mut f = BasisFactor::new(&A, &head, &settings).unwrap();
        for (p, q) in [(0, 0), (2, 2), (1, 1)] {
            let (rows, vals) = column_of(&A, q);
            let mut w = vec![0.; 3];
            for (r, v) in rows.iter().zip(vals) {
                w[*r] = v;
            }
            f.solve(&mut w);
            f.update(p, &w);
            head[p] = q;
        }
        assert_eq!(f.num_updates(), 3);

        let b = vec![1., -2., 0.5];
        let mut x = b.clone();
        f.solve(&mut x);
        assert!(dense_mul(&A, &head, &x).norm_inf_diff(&b) < 1e-12);

        let mut y = b.clone();
        f.solve_transpose(&mut y);
        let B = basis_matrix(&A, &head);
        let mut r = vec![0.; 3];
        B.t().gemv(&mut r, &y, 1., 0.);
        assert!(r.norm_inf_diff(&b) < 1e-12);

        let xs = f.solve_sparse(&SparseVector::from_dense(&b), false);
        assert!(xs.to_dense().norm_inf_diff(&x) < 1e-12);
    }

    #[test]
    fn test_singular_basis_repair() {
        // columns 0 and 1 are parallel
        let A = CscMatrix::from_dense_rows(&[vec![1., 2.], vec![1., 2.]]);
        let mut head = vec![0, 1];
        let settings = LuSettings::default();
        assert!(BasisFactor::new(&A, &head, &settings).is_err());

        let repaired = BasisFactor::new_with_repair(&A, &mut head, &settings).unwrap();
        assert_eq!(repaired.dropped.len(), 1);
        assert!(head.iter().any(|&k| k >= 2));
    }
}
