#![allow(non_snake_case)]
use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

/// Errors from [`SparseLU`] factorization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LuError {
    #[error("Matrix must be square")]
    IncompatibleDimension,
    /// A column without an acceptable pivot.  `column` indexes the
    /// input matrix, `unpivoted_rows` lists rows without a pivot.
    #[error("Degenerate matrix: no acceptable pivot in column {column}")]
    DegenerateMatrix {
        column: usize,
        unpivoted_rows: Vec<usize>,
    },
    #[error("Fill reducing ordering failed")]
    Ordering,
}

/// Settings for [`SparseLU`]
#[derive(Builder, Debug, Clone)]
pub struct LuSettings<T: FloatT> {
    /// relative threshold for accepting the preferred (diagonal) pivot
    #[builder(default = "(0.1).as_T()")]
    pub pivot_threshold: T,
    /// absolute threshold below which a pivot is treated as zero
    #[builder(default = "(1e-11).as_T()")]
    pub singular_tol: T,
    /// compute an AMD column ordering. Natural order otherwise
    #[builder(default = "true")]
    pub ordering: bool,
}

impl<T: FloatT> Default for LuSettings<T> {
    fn default() -> Self {
        LuSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Factors `P*A*Q = L*U` for square sparse `A`.
///
/// `L` is unit lower triangular with the unit diagonal implied,
/// `U` is strictly upper triangular with its diagonal in `Udiag`.
/// Both are indexed by pivot position.  Transposed copies are kept
/// for transposed sparse solves.
#[derive(Debug, Clone)]
pub struct SparseLU<T = f64> {
    pub n: usize,
    /// column `k` of the factors is column `q[k]` of `A`
    pub q: Vec<usize>,
    /// row `i` of `A` is pivot row `pinv[i]`
    pub pinv: Vec<usize>,
    pub L: CscMatrix<T>,
    pub U: CscMatrix<T>,
    pub Udiag: Vec<T>,
    pub(crate) qinv: Vec<usize>,
    pub(crate) p: Vec<usize>,
    pub(crate) Lt: CscMatrix<T>,
    pub(crate) Ut: CscMatrix<T>,
    pub(crate) work: LuWorkspace<T>,
}

#[derive(Debug, Clone)]
pub(crate) struct LuWorkspace<T> {
    pub(crate) x: Vec<T>,
    pub(crate) y: Vec<T>,
    pub(crate) xi: Vec<usize>,
    pub(crate) stack: Vec<(usize, usize)>,
    pub(crate) marks: Vec<bool>,
}

impl<T: FloatT> LuWorkspace<T> {
    fn new(n: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); n],
            xi: Vec::with_capacity(n),
            stack: Vec::with_capacity(n),
            marks: vec![false; n],
        }
    }
}

const UNPIVOTED: usize = usize::MAX;

impl<T> SparseLU<T>
where
    T: FloatT,
{
    pub fn factor(A: &CscMatrix<T>, settings: &LuSettings<T>) -> Result<Self, LuError> {
        if !A.is_square() {
            return Err(LuError::IncompatibleDimension);
        }
        let n = A.n;

        let q = if settings.ordering && n > 1 {
            column_ordering(A)?
        } else {
            (0..n).collect()
        };

        let mut pinv = vec![UNPIVOTED; n];
        // L is built with rows in the original numbering and
        // renumbered by pinv at the end
        let mut Lp = Vec::with_capacity(n + 1);
        let mut Li = Vec::with_capacity(A.nnz() + n);
        let mut Lx = Vec::with_capacity(A.nnz() + n);
        let mut Up = Vec::with_capacity(n + 1);
        let mut Ui = Vec::with_capacity(A.nnz());
        let mut Ux = Vec::with_capacity(A.nnz());
        let mut Udiag = vec![T::zero(); n];
        Lp.push(0);
        Up.push(0);

        let mut work = LuWorkspace::new(n);

        for k in 0..n {
            let col = q[k];

            // x = L \ A[:,col] restricted to the reach of A[:,col]
            let (rows, vals) = A.col(col);
            reach_lower(&Lp, &Li, &pinv, rows, &mut work);
            for &i in &work.xi {
                work.x[i] = T::zero();
            }
            for (&r, &v) in rows.iter().zip(vals) {
                work.x[r] = v;
            }
            for t in 0..work.xi.len() {
                let j = work.xi[t];
                let J = pinv[j];
                if J == UNPIVOTED {
                    continue;
                }
                // unit diagonal of L sits first in column J
                let xj = work.x[j];
                for p in (Lp[J] + 1)..Lp[J + 1] {
                    work.x[Li[p]] -= Lx[p] * xj;
                }
            }

            // choose pivot among unpivoted rows, preferring the diagonal
            let mut ipiv = UNPIVOTED;
            let mut amax = T::zero();
            for &i in &work.xi {
                if pinv[i] == UNPIVOTED {
                    let a = work.x[i].abs();
                    if a > amax {
                        amax = a;
                        ipiv = i;
                    }
                } else {
                    Ui.push(pinv[i]);
                    Ux.push(work.x[i]);
                }
            }
            if ipiv == UNPIVOTED || amax <= settings.singular_tol || !amax.is_finite() {
                let unpivoted_rows = (0..n).filter(|&i| pinv[i] == UNPIVOTED).collect();
                return Err(LuError::DegenerateMatrix {
                    column: col,
                    unpivoted_rows,
                });
            }
            if pinv[col] == UNPIVOTED && work.x[col].abs() >= amax * settings.pivot_threshold {
                ipiv = col;
            }

            let pivot = work.x[ipiv];
            Udiag[k] = pivot;
            Up.push(Ui.len());
            pinv[ipiv] = k;

            Li.push(ipiv);
            Lx.push(T::one());
            for &i in &work.xi {
                if pinv[i] == UNPIVOTED {
                    let v = work.x[i] / pivot;
                    if v != T::zero() {
                        Li.push(i);
                        Lx.push(v);
                    }
                }
                work.x[i] = T::zero();
            }
            Lp.push(Li.len());
        }

        // renumber L rows into pivot order and strip the unit diagonal
        let mut Lcolptr = Vec::with_capacity(n + 1);
        let mut Lrowval = Vec::with_capacity(Li.len() - n);
        let mut Lnzval = Vec::with_capacity(Li.len() - n);
        Lcolptr.push(0);
        for k in 0..n {
            for p in (Lp[k] + 1)..Lp[k + 1] {
                Lrowval.push(pinv[Li[p]]);
                Lnzval.push(Lx[p]);
            }
            Lcolptr.push(Lrowval.len());
        }
        let L = sorted(CscMatrix::new(n, n, Lcolptr, Lrowval, Lnzval));
        let U = sorted(CscMatrix::new(n, n, Up, Ui, Ux));
        let Lt = L.transpose();
        let Ut = U.transpose();
        let mut qinv = vec![0; n];
        let mut p = vec![0; n];
        for k in 0..n {
            qinv[q[k]] = k;
            p[pinv[k]] = k;
        }

        Ok(Self {
            n,
            q,
            pinv,
            L,
            U,
            Udiag,
            qinv,
            p,
            Lt,
            Ut,
            work,
        })
    }

    /// nonzeros in L and U, including the diagonal of U
    pub fn nnz(&self) -> usize {
        self.L.nnz() + self.U.nnz() + self.n
    }
}

// Depth first search from the rows of b through the graph of the
// partially built L.  Leaves the reach in topological order in `xi`.
fn reach_lower<T: FloatT>(
    Lp: &[usize],
    Li: &[usize],
    pinv: &[usize],
    rows: &[usize],
    work: &mut LuWorkspace<T>,
) {
    work.xi.clear();
    for &r in rows {
        if work.marks[r] {
            continue;
        }
        work.stack.push((r, 0));
        work.marks[r] = true;
        while let Some(&(j, next)) = work.stack.last() {
            let J = pinv[j];
            let (start, end) = if J == UNPIVOTED {
                (0, 0)
            } else {
                (Lp[J] + 1, Lp[J + 1])
            };
            let mut p = start + next;
            while p < end && work.marks[Li[p]] {
                p += 1;
            }
            if p < end {
                let i = Li[p];
                if let Some(top) = work.stack.last_mut() {
                    top.1 = p + 1 - start;
                }
                work.marks[i] = true;
                work.stack.push((i, 0));
            } else {
                work.stack.pop();
                work.xi.push(j);
            }
        }
    }
    // finish order reversed is a topological order
    work.xi.reverse();
    for &i in &work.xi {
        work.marks[i] = false;
    }
}

fn column_ordering<T: FloatT>(A: &CscMatrix<T>) -> Result<Vec<usize>, LuError> {
    // pattern of A + A'
    let At = A.transpose();
    let n = A.n;
    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::with_capacity(2 * A.nnz());
    colptr.push(0);
    for j in 0..n {
        let start = rowval.len();
        rowval.extend_from_slice(A.col(j).0);
        rowval.extend_from_slice(At.col(j).0);
        rowval[start..].sort_unstable();
        let mut w = start;
        for r in start..rowval.len() {
            if r == start || rowval[r] != rowval[w - 1] {
                rowval[w] = rowval[r];
                w += 1;
            }
        }
        rowval.truncate(w);
        colptr.push(rowval.len());
    }
    let control = amd::Control::default();
    let (perm, _iperm, _info) =
        amd::order(n, &colptr, &rowval, &control).map_err(|_| LuError::Ordering)?;
    Ok(perm)
}

// sort row indices within each column
fn sorted<T: FloatT>(M: CscMatrix<T>) -> CscMatrix<T> {
    // a double transpose sorts rows
    M.transpose().transpose()
}
