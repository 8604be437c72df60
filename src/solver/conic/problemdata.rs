#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::conic::cones::{CompositeCone, Cone};

/// Diagonal scalings from the Ruiz equilibration
pub struct EquilibrationData<T> {
    /// variable scaling
    pub d: Vec<T>,
    pub dinv: Vec<T>,
    /// constraint scaling
    pub e: Vec<T>,
    pub einv: Vec<T>,
    /// overall scaling of the objective
    pub c: T,
}

impl<T> EquilibrationData<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }
}

/// Problem data in the engine's standard form
///
/// ```text
/// min  ½xᵀPx + qᵀx   s.t.  Ax + s = b,  s ∈ K
/// ```
///
/// with `P` held as its upper triangle.  The data is equilibrated
/// in place by [`equilibrate`](Self::equilibrate).
pub struct ConicProblemData<T> {
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub n: usize,
    pub m: usize,
    pub equilibration: EquilibrationData<T>,

    // norms of the unscaled data
    pub normq: T,
    pub normb: T,
}

impl<T> ConicProblemData<T>
where
    T: FloatT,
{
    pub fn new(P: &CscMatrix<T>, q: &[T], A: &CscMatrix<T>, b: &[T]) -> Self {
        let P = P.to_triu();
        let (m, n) = (A.m, A.n);

        Self {
            P,
            q: q.to_vec(),
            A: A.clone(),
            b: b.to_vec(),
            n,
            m,
            equilibration: EquilibrationData::new(n, m),
            normq: q.norm_inf(),
            normb: b.norm_inf(),
        }
    }

    pub(crate) fn equilibrate(&mut self, cones: &CompositeCone<T>, settings: &ConicSettings<T>) {
        let equil = &mut self.equilibration;

        // identity scaling is already in place
        if !settings.equilibrate_enable {
            return;
        }

        let (d, e) = (&mut equil.d, &mut equil.e);

        // the inverse scalings serve as work vectors
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;

        let (P, A, q, b) = (&mut self.P, &mut self.A, &mut self.q, &mut self.b);

        let scale_min = settings.equilibrate_min_scaling;
        let scale_max = settings.equilibrate_max_scaling;

        for _ in 0..settings.equilibrate_max_iter {
            kkt_col_norms(P, A, dwork, ework);

            dwork.scalarop(|x| limit_scaling(x, scale_min, scale_max));
            ework.scalarop(|x| limit_scaling(x, scale_min, scale_max));

            dwork.rsqrt();
            ework.rsqrt();

            scale_data(P, A, q, b, Some(dwork), ework);
            d.hadamard(dwork);
            e.hadamard(ework);

            // column norms of the scaled P for the cost scaling
            P.col_norms_sym(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = q.norm_inf();

            if mean_col_norm_P != T::zero() && inf_norm_q != T::zero() {
                let scale_cost = T::max(inf_norm_q, mean_col_norm_P);
                let scale_cost = limit_scaling(scale_cost, scale_min, scale_max);
                let ctmp = T::recip(scale_cost);

                P.scale(ctmp);
                q.scale(ctmp);
                equil.c *= ctmp;
            }
        }

        // cones that can't take elementwise scaling
        if cones.rectify_equilibration(ework, e) {
            scale_data(P, A, q, b, None, ework);
            e.hadamard(ework);
        }

        equil.dinv.scalarop_from(T::recip, d);
        equil.einv.scalarop_from(T::recip, e);
    }
}

fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS);
    A.col_norms_no_reset(norm_LHS);
    A.row_norms(norm_RHS);
}

fn limit_scaling<T: FloatT>(s: T, minval: T, maxval: T) -> T {
    // tiny norms map to one, huge norms are capped
    if s < minval {
        T::one()
    } else if s > maxval {
        maxval
    } else {
        s
    }
}

fn scale_data<T: FloatT>(
    P: &mut CscMatrix<T>,
    A: &mut CscMatrix<T>,
    q: &mut [T],
    b: &mut [T],
    d: Option<&[T]>,
    e: &[T],
) {
    match d {
        Some(d) => {
            P.lrscale(d, d);
            A.lrscale(e, d);
            q.hadamard(d);
        }
        None => {
            A.lscale(e);
        }
    }
    b.hadamard(e);
}

#[test]
fn test_equilibration_bounds() {
    use crate::solver::conic::cones::SupportedConeT;

    let P = CscMatrix::from_dense_rows(&[vec![1e6, 0.], vec![0., 1e-6]]);
    let A = CscMatrix::from_dense_rows(&[vec![1e3, 1.], vec![0., 1e-3]]);
    let q = vec![1., 1.];
    let b = vec![1., 1.];
    let cones = CompositeCone::new(&[SupportedConeT::NonnegativeConeT(2)]);

    let mut data = ConicProblemData::new(&P, &q, &A, &b);
    let settings = ConicSettings::<f64>::default();
    data.equilibrate(&cones, &settings);

    let eq = &data.equilibration;
    for (di, dinv) in eq.d.iter().zip(&eq.dinv) {
        assert!((di * dinv - 1.).abs() < 1e-12);
        assert!(*di > 0.);
    }
    // scaled A = E*A*D
    let a00 = data.A.get_entry((0, 0)).unwrap();
    assert!((a00 - eq.e[0] * 1e3 * eq.d[0]).abs() < 1e-9 * a00.abs().max(1.));
}
