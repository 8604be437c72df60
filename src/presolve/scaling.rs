//! Geometric row and column scaling of linear problems for the simplex.
//!
//! The scaled problem has `A' = RAS`, `c' = Sc`, column bounds divided
//! by `S` and row bounds multiplied by `R`.  Factors are powers of two
//! so that scaling and unscaling are exact.

#![allow(non_snake_case)]

use crate::solver::simplex::{BoundedLp, SimplexSolution};

const SCALING_PASSES: usize = 4;

#[derive(Debug, Clone)]
pub(crate) struct LpScaling {
    pub row: Vec<f64>,
    pub col: Vec<f64>,
}

fn pow2(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v.log2().round().exp2()
    } else {
        1.0
    }
}

impl LpScaling {
    /// Compute scaling factors of `lp` by alternating geometric means
    /// of the entries of each row and column
    pub fn new(lp: &BoundedLp<f64>) -> Self {
        let (m, n) = (lp.A.m, lp.A.n);
        let mut row = vec![1.0; m];
        let mut col = vec![1.0; n];
        let A = &lp.A;

        for _ in 0..SCALING_PASSES {
            // rows
            let mut rmin = vec![f64::INFINITY; m];
            let mut rmax = vec![0.0f64; m];
            for j in 0..n {
                let (ri, rv) = A.col(j);
                for (&i, &v) in ri.iter().zip(rv) {
                    let a = (v * col[j]).abs();
                    if a > 0.0 {
                        rmin[i] = rmin[i].min(a);
                        rmax[i] = rmax[i].max(a);
                    }
                }
            }
            for i in 0..m {
                if rmax[i] > 0.0 {
                    row[i] = pow2(1.0 / (rmin[i] * rmax[i]).sqrt());
                }
            }

            // columns
            for j in 0..n {
                let (ri, rv) = A.col(j);
                let (mut cmin, mut cmax) = (f64::INFINITY, 0.0f64);
                for (&i, &v) in ri.iter().zip(rv) {
                    let a = (v * row[i]).abs();
                    if a > 0.0 {
                        cmin = cmin.min(a);
                        cmax = cmax.max(a);
                    }
                }
                if cmax > 0.0 {
                    col[j] = pow2(1.0 / (cmin * cmax).sqrt());
                }
            }
        }
        Self { row, col }
    }

    pub fn is_identity(&self) -> bool {
        self.row.iter().chain(self.col.iter()).all(|&s| s == 1.0)
    }

    pub fn scale(&self, lp: &BoundedLp<f64>) -> BoundedLp<f64> {
        let mut A = lp.A.clone();
        for j in 0..A.n {
            for k in A.colptr[j]..A.colptr[j + 1] {
                A.nzval[k] *= self.row[A.rowval[k]] * self.col[j];
            }
        }
        BoundedLp {
            A,
            c: lp.c.iter().zip(&self.col).map(|(c, s)| c * s).collect(),
            lc: lp.lc.iter().zip(&self.row).map(|(l, r)| l * r).collect(),
            uc: lp.uc.iter().zip(&self.row).map(|(u, r)| u * r).collect(),
            lx: lp.lx.iter().zip(&self.col).map(|(l, s)| l / s).collect(),
            ux: lp.ux.iter().zip(&self.col).map(|(u, s)| u / s).collect(),
        }
    }

    /// Map a solution of the scaled problem back in place
    pub fn unscale(&self, sol: &mut SimplexSolution<f64>) {
        use crate::solver::simplex::SimplexStatus;

        for (j, s) in self.col.iter().enumerate() {
            sol.x[j] *= s;
            sol.d[j] /= s;
        }
        for (i, r) in self.row.iter().enumerate() {
            sol.r[i] /= r;
            sol.y[i] *= r;
        }
        if let Some(ray) = sol.ray.as_mut() {
            match sol.status {
                SimplexStatus::PrimalInfeasible => {
                    ray.iter_mut().zip(&self.row).for_each(|(v, r)| *v *= r);
                }
                SimplexStatus::DualInfeasible => {
                    ray.iter_mut().zip(&self.col).for_each(|(v, s)| *v *= s);
                }
                _ => {}
            }
        }
    }
}
