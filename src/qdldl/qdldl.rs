#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`] factor operations
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot at column {0}")]
    ZeroPivot(usize),
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("Fill reducing ordering failed")]
    Ordering,
}

/// Settings for [`QDLDLFactorisation`]
#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    /// scaling of the AMD dense row threshold
    #[builder(default = "1.0")]
    pub amd_dense_scale: f64,
    /// user supplied ordering.  AMD is used if `None`
    #[builder(default = "None", setter(strip_option))]
    pub perm: Option<Vec<usize>>,
    /// expected signs of the diagonal of D
    #[builder(default = "None", setter(strip_option))]
    pub Dsigns: Option<Vec<i8>>,
    #[builder(default = "true")]
    pub regularize_enable: bool,
    #[builder(default = "(1e-12).as_T()")]
    pub regularize_eps: T,
    #[builder(default = "(1e-7).as_T()")]
    pub regularize_delta: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// $LDL^T$ factorization of a symmetric quasidefinite matrix.
///
/// Holds the permuted copy of the input so that entries can be updated
/// in place (see [`update_values`](Self::update_values)) and the
/// matrix refactored without repeating the symbolic analysis.
#[derive(Debug, Clone)]
pub struct QDLDLFactorisation<T = f64> {
    /// fill reducing permutation
    pub perm: Vec<usize>,
    /// strictly lower triangular factor, unit diagonal implied
    pub L: CscMatrix<T>,
    pub D: Vec<T>,
    pub Dinv: Vec<T>,

    // post ordering copy of the input (upper triangle) and
    // the map from input entries to its entries
    triuA: CscMatrix<T>,
    AtoPAPt: Vec<usize>,

    symbolic: Symbolic,
    work: Workspace<T>,

    Dsigns: Vec<i8>,
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,

    positive_inertia: usize,
    regularize_count: usize,
}

// elimination tree and column counts of L
#[derive(Debug, Clone)]
struct Symbolic {
    etree: Vec<usize>,
    Lnz: Vec<usize>,
}

#[derive(Debug, Clone)]
struct Workspace<T> {
    y_markers: Vec<bool>,
    y_idx: Vec<usize>,
    elim_buffer: Vec<usize>,
    next_colspace: Vec<usize>,
    y_vals: Vec<T>,
    fwork: Vec<T>,
}

impl<T: FloatT> Workspace<T> {
    fn new(n: usize) -> Self {
        Self {
            y_markers: vec![false; n],
            y_idx: vec![0; n],
            elim_buffer: vec![0; n],
            next_colspace: vec![0; n],
            y_vals: vec![T::zero(); n],
            fwork: vec![T::zero(); n],
        }
    }
}

const ETREE_ROOT: usize = usize::MAX;

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    /// Analyse and factor the upper triangular matrix `Ain`.
    pub fn new(Ain: &CscMatrix<T>, opts: Option<QDLDLSettings<T>>) -> Result<Self, QDLDLError> {
        check_structure(Ain)?;
        let opts = opts.unwrap_or_default();
        let n = Ain.nrows();

        let (perm, iperm) = match opts.perm {
            Some(p) => {
                let ip = invperm(&p)?;
                (p, ip)
            }
            None => amd_ordering(Ain, opts.amd_dense_scale)?,
        };

        let (triuA, AtoPAPt) = permute_symmetric(Ain, &iperm);

        let mut Dsigns = vec![1_i8; n];
        if let Some(ds) = opts.Dsigns {
            if ds.len() != n {
                return Err(QDLDLError::IncompatibleDimension);
            }
            permute(&mut Dsigns, &ds, &perm);
        }

        let symbolic = etree(&triuA);
        let nnzL = symbolic.Lnz.iter().sum();

        let mut factors = Self {
            perm,
            L: CscMatrix::spalloc(n, n, nnzL),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            triuA,
            AtoPAPt,
            symbolic,
            work: Workspace::new(n),
            Dsigns,
            regularize_enable: opts.regularize_enable,
            regularize_eps: opts.regularize_eps,
            regularize_delta: opts.regularize_delta,
            positive_inertia: 0,
            regularize_count: 0,
        };
        factors.refactor()?;
        Ok(factors)
    }

    /// number of positive entries in D
    pub fn positive_inertia(&self) -> usize {
        self.positive_inertia
    }

    /// number of pivots replaced by dynamic regularization
    pub fn regularize_count(&self) -> usize {
        self.regularize_count
    }

    /// Solves `Ax = b` in place using the current factors.
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.work.fwork;
        permute(tmp, b, &self.perm);

        lsolve(&self.L, tmp);
        zip(tmp.iter_mut(), &self.Dinv).for_each(|(x, d)| *x *= *d);
        ltsolve(&self.L, tmp);

        ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the input matrix, addressed by their
    /// position in the nonzero array of the original upper triangle.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        for (&idx, &v) in zip(indices, values) {
            self.triuA.nzval[self.AtoPAPt[idx]] = v;
        }
    }

    pub fn scale_values(&mut self, indices: &[usize], scale: T) {
        for &idx in indices {
            self.triuA.nzval[self.AtoPAPt[idx]] *= scale;
        }
    }

    /// Add `offset * sign` to the given entries of the input matrix
    pub fn offset_values(&mut self, indices: &[usize], offset: T, signs: &[i8]) {
        assert_eq!(indices.len(), signs.len());
        for (&idx, &sign) in zip(indices, signs) {
            let sign: T = if sign < 0 { -T::one() } else { T::one() };
            self.triuA.nzval[self.AtoPAPt[idx]] += offset * sign;
        }
    }

    /// Numeric refactorization with the existing symbolic analysis
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        self.numeric()
    }

    // Up-looking numeric factorization.  Row k of L is the solution
    // of a triangular system with the part of column k of A above the
    // diagonal, with its pattern found by walking the elimination tree.
    fn numeric(&mut self) -> Result<(), QDLDLError> {
        let A = &self.triuA;
        let n = A.n;
        let L = &mut self.L;
        let D = &mut self.D;
        let Dinv = &mut self.Dinv;
        let etree = &self.symbolic.etree;
        let w = &mut self.work;

        self.regularize_count = 0;
        let mut positive = 0;

        L.colptr[0] = 0;
        for k in 0..n {
            L.colptr[k + 1] = L.colptr[k] + self.symbolic.Lnz[k];
        }
        w.y_markers.fill(false);
        w.y_vals.fill(T::zero());
        D.fill(T::zero());
        w.next_colspace.copy_from_slice(&L.colptr[0..n]);

        for k in 0..n {
            let mut nnz_y = 0;

            for p in A.colptr[k]..A.colptr[k + 1] {
                let bidx = A.rowval[p];
                if bidx == k {
                    D[k] = A.nzval[p];
                    continue;
                }
                w.y_vals[bidx] = A.nzval[p];

                if w.y_markers[bidx] {
                    continue;
                }
                // walk up the tree until a visited node or column k
                w.y_markers[bidx] = true;
                w.elim_buffer[0] = bidx;
                let mut nnz_e = 1;
                let mut next = etree[bidx];
                while next != ETREE_ROOT && next < k && !w.y_markers[next] {
                    w.y_markers[next] = true;
                    w.elim_buffer[nnz_e] = next;
                    nnz_e += 1;
                    next = etree[next];
                }
                while nnz_e != 0 {
                    nnz_e -= 1;
                    w.y_idx[nnz_y] = w.elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }

            for i in (0..nnz_y).rev() {
                let cidx = w.y_idx[i];
                let slot = w.next_colspace[cidx];
                let yc = w.y_vals[cidx];

                for j in L.colptr[cidx]..slot {
                    w.y_vals[L.rowval[j]] -= L.nzval[j] * yc;
                }

                L.nzval[slot] = yc * Dinv[cidx];
                L.rowval[slot] = k;
                D[k] -= yc * L.nzval[slot];
                w.next_colspace[cidx] += 1;

                w.y_vals[cidx] = T::zero();
                w.y_markers[cidx] = false;
            }

            if self.regularize_enable {
                let sign = if self.Dsigns[k] < 0 { -T::one() } else { T::one() };
                if D[k] * sign < self.regularize_eps {
                    D[k] = self.regularize_delta * sign;
                    self.regularize_count += 1;
                }
            }

            if D[k] == T::zero() || !D[k].is_finite() {
                return Err(QDLDLError::ZeroPivot(k));
            }
            if D[k] > T::zero() {
                positive += 1;
            }
            Dinv[k] = T::recip(D[k]);
        }

        self.positive_inertia = positive;
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }
    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }
    Ok(())
}

// Elimination tree and nonzero counts per column of L
fn etree<T: FloatT>(A: &CscMatrix<T>) -> Symbolic {
    let n = A.n;
    let mut work = vec![0; n];
    let mut Lnz = vec![0; n];
    let mut etree = vec![ETREE_ROOT; n];

    for j in 0..n {
        work[j] = j;
        for &row in &A.rowval[A.colptr[j]..A.colptr[j + 1]] {
            let mut i = row;
            while work[i] != j {
                if etree[i] == ETREE_ROOT {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
    Symbolic { etree, Lnz }
}

// Solves (L+I)x = b in place
fn lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let (rows, vals) = L.col(i);
        for (&r, &v) in zip(rows, vals) {
            x[r] -= v * xi;
        }
    }
}

// Solves (L+I)'x = b in place
fn ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let (rows, vals) = L.col(i);
        let s = zip(rows, vals).fold(T::zero(), |acc, (&r, &v)| acc + v * x[r]);
        x[i] -= s;
    }
}

fn invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![usize::MAX; p.len()];
    for (i, &j) in p.iter().enumerate() {
        if j >= p.len() || b[j] != usize::MAX {
            return Err(QDLDLError::InvalidPermutation);
        }
        b[j] = i;
    }
    Ok(b)
}

fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Symmetric permutation P*A*P' of an upper triangular matrix, returned
// in upper triangular form, together with the position of each input
// entry in the output.  Columns of the output are not row-sorted.
fn permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    let mut counts = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in &A.rowval[A.colptr[colA]..A.colptr[colA + 1]] {
            if rowA <= colA {
                counts[max(iperm[rowA], colP)] += 1;
            }
        }
    }

    P.colptr[0] = 0;
    for k in 0..n {
        P.colptr[k + 1] = P.colptr[k] + counts[k];
    }
    let mut next = P.colptr[0..n].to_vec();

    for colA in 0..n {
        let colP = iperm[colA];
        for idx in A.colptr[colA]..A.colptr[colA + 1] {
            let rowA = A.rowval[idx];
            if rowA > colA {
                continue;
            }
            let rowP = iperm[rowA];
            let col = max(colP, rowP);
            let slot = next[col];
            P.rowval[slot] = min(colP, rowP);
            P.nzval[slot] = A.nzval[idx];
            AtoPAPt[idx] = slot;
            next[col] += 1;
        }
    }
    P.nzval.truncate(P.colptr[n]);
    P.rowval.truncate(P.colptr[n]);
    (P, AtoPAPt)
}

fn amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::Ordering)?;
    Ok((perm, iperm))
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
