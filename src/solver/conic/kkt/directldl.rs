#![allow(non_snake_case)]

use super::assembly::*;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::conic::{cones::*, ConicSettings};
use std::iter::zip;

// factor applied to the static regularizer when
// a factorization is retried after failure
const REGULARIZER_RETRY_SCALE: f64 = 1e3;

// -------------------------------------
// KKT solver using a direct LDL factorisation
// -------------------------------------

pub(crate) struct DirectLDLKKTSolver<T: FloatT> {
    // problem dimensions
    m: usize,
    n: usize,

    // Left and right hand sides for solves
    x: Vec<T>,
    b: Vec<T>,

    // internal workspace for IR scheme
    // and static offsetting of KKT
    work1: Vec<T>,
    work2: Vec<T>,

    // KKT mapping from problem data to KKT
    map: KKTDataMap,

    // the expected signs of D in KKT = LDL^T
    dsigns: Vec<i8>,

    // entries of the Hs blocks on the KKT block diagonal
    Hsblocks: Vec<T>,

    //unpermuted KKT matrix
    KKT: CscMatrix<T>,

    ldlsolver: QDLDLFactorisation<T>,

    // the diagonal regularizer currently applied
    pub(crate) diagonal_regularizer: T,

    // number of factorizations that needed a retry
    pub(crate) retry_count: usize,
}

impl<T> DirectLDLKKTSolver<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        cones: &CompositeCone<T>,
        settings: &ConicSettings<T>,
    ) -> Result<Self, QDLDLError> {
        let (m, n) = (A.m, A.n);

        let x = vec![T::zero(); n + m];
        let b = vec![T::zero(); n + m];
        let work1 = vec![T::zero(); n + m];
        let work2 = vec![T::zero(); n + m];

        let mut dsigns = vec![1_i8; n + m];
        dsigns[n..].iter_mut().for_each(|x| *x = -1);

        let Hsblocks = allocate_kkt_Hsblocks::<T, T>(cones);

        let (KKT, map) = assemble_kkt_matrix(P, A, cones);

        // the symbolic analysis is done on a copy with a unit
        // signed diagonal so that the initial numeric pass can't fail
        let mut Kinit = KKT.clone();
        for (&idx, &sign) in zip(&map.diag_full, &dsigns) {
            Kinit.nzval[idx] = if sign > 0 { T::one() } else { -T::one() };
        }

        let opts = QDLDLSettingsBuilder::<T>::default()
            .Dsigns(dsigns.clone())
            .regularize_enable(settings.dynamic_regularization_enable)
            .regularize_eps(settings.dynamic_regularization_eps)
            .regularize_delta(settings.dynamic_regularization_delta)
            .build()
            .map_err(|_| QDLDLError::IncompatibleDimension)?;

        let mut ldlsolver = QDLDLFactorisation::new(&Kinit, Some(opts))?;
        let diagvals: Vec<T> = map.diag_full.iter().map(|&i| KKT.nzval[i]).collect();
        ldlsolver.update_values(&map.diag_full, &diagvals);

        Ok(Self {
            m,
            n,
            x,
            b,
            work1,
            work2,
            map,
            dsigns,
            Hsblocks,
            KKT,
            ldlsolver,
            diagonal_regularizer: T::zero(),
            retry_count: 0,
        })
    }

    pub fn update(&mut self, cones: &CompositeCone<T>, settings: &ConicSettings<T>) -> bool {
        // Set the elements of the Hs blocks in the KKT matrix.
        cones.get_Hs(&mut self.Hsblocks);
        self.Hsblocks.negate();
        _update_values(
            &mut self.ldlsolver,
            &mut self.KKT,
            &self.map.Hsblocks,
            &self.Hsblocks,
        );

        if self.regularize_and_refactor(settings, T::one()) {
            return true;
        }

        // one more attempt with a heavier static regularization
        self.retry_count += 1;
        log::debug!("KKT factorization failed, retrying with increased regularization");
        self.regularize_and_refactor(settings, REGULARIZER_RETRY_SCALE.as_T())
    }

    pub fn setrhs(&mut self, rhsx: &[T], rhsz: &[T]) {
        let (m, n) = (self.m, self.n);
        self.b[0..n].copy_from(rhsx);
        self.b[n..(n + m)].copy_from(rhsz);
    }

    pub fn solve(
        &mut self,
        lhsx: Option<&mut [T]>,
        lhsz: Option<&mut [T]>,
        settings: &ConicSettings<T>,
    ) -> bool {
        self.x.copy_from(&self.b);
        self.ldlsolver.solve(&mut self.x);

        let is_success = {
            if settings.iterative_refinement_enable {
                self.iterative_refinement(settings)
            } else {
                self.x.is_finite()
            }
        };

        if is_success {
            self.getlhs(lhsx, lhsz);
        }

        is_success
    }

    fn getlhs(&self, lhsx: Option<&mut [T]>, lhsz: Option<&mut [T]>) {
        let x = &self.x;
        let (m, n) = (self.m, self.n);

        if let Some(v) = lhsx {
            v.copy_from(&x[0..n]);
        }
        if let Some(v) = lhsz {
            v.copy_from(&x[n..(n + m)]);
        }
    }

    fn regularize_and_refactor(&mut self, settings: &ConicSettings<T>, scale: T) -> bool {
        let map = &self.map;
        let KKT = &mut self.KKT;
        let dsigns = &self.dsigns;
        let diag_kkt = &mut self.work1;
        let diag_shifted = &mut self.work2;

        let regularize = settings.static_regularization_enable || scale > T::one();

        if regularize {
            // hold a copy of the true KKT diagonal
            for (d, idx) in zip(&mut *diag_kkt, &map.diag_full) {
                *d = KKT.nzval[*idx];
            }

            let eps = _compute_regularizer(diag_kkt, settings) * scale;

            diag_shifted.copy_from(diag_kkt);
            zip(&mut *diag_shifted, dsigns).for_each(|(shift, &sign)| {
                if sign == 1 {
                    *shift += eps;
                } else {
                    *shift -= eps;
                }
            });

            _update_values(&mut self.ldlsolver, KKT, &map.diag_full, diag_shifted);
            self.diagonal_regularizer = eps;
        }

        let is_success = self.ldlsolver.refactor().is_ok() && self.ldlsolver.D.is_finite();

        if regularize {
            // restore our own copy for the refinement residuals
            _update_values_KKT(KKT, &map.diag_full, diag_kkt);
        }

        is_success
    }

    fn iterative_refinement(&mut self, settings: &ConicSettings<T>) -> bool {
        let (x, b) = (&mut self.x, &self.b);
        let (e, dx) = (&mut self.work1, &mut self.work2);

        let reltol = settings.iterative_refinement_reltol;
        let abstol = settings.iterative_refinement_abstol;
        let maxiter = settings.iterative_refinement_max_iter;
        let stopratio = settings.iterative_refinement_stop_ratio;

        let K = &self.KKT;
        let normb = b.norm_inf();

        let mut norme = _get_refine_error(e, b, K, x);

        for _ in 0..maxiter {
            if !norme.is_finite() {
                return false;
            }

            if norme <= (abstol + reltol * normb) {
                break;
            }

            let lastnorme = norme;

            dx.copy_from(e);
            self.ldlsolver.solve(dx);

            // dx becomes the candidate x + dx
            dx.axpby(T::one(), x, T::one());
            norme = _get_refine_error(e, b, K, dx);

            let improved_ratio = lastnorme / norme;
            if improved_ratio < stopratio {
                if improved_ratio > T::one() {
                    std::mem::swap(x, dx);
                }
                break;
            } else {
                std::mem::swap(x, dx);
            }
        }
        // success only means the result is finite
        x.is_finite()
    }
}

fn _compute_regularizer<T: FloatT>(diag_kkt: &[T], settings: &ConicSettings<T>) -> T {
    let maxdiag = diag_kkt.norm_inf();
    settings.static_regularization_constant + settings.static_regularization_proportional * maxdiag
}

//  computes e = b - Kξ, overwriting the first argument
//  and returning its norm.  K is triu only.
fn _get_refine_error<T: FloatT>(e: &mut [T], b: &[T], K: &CscMatrix<T>, ξ: &[T]) -> T {
    e.copy_from(b);
    K.sym().symv(e, ξ, -T::one(), T::one());
    e.norm_inf()
}

fn _update_values<T: FloatT>(
    ldlsolver: &mut QDLDLFactorisation<T>,
    KKT: &mut CscMatrix<T>,
    index: &[usize],
    values: &[T],
) {
    _update_values_KKT(KKT, index, values);
    ldlsolver.update_values(index, values);
}

fn _update_values_KKT<T: FloatT>(KKT: &mut CscMatrix<T>, index: &[usize], values: &[T]) {
    for (idx, v) in zip(index, values) {
        KKT.nzval[*idx] = *v;
    }
}
