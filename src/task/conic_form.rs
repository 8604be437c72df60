//! Conversion between task problems and the interior point standard form
//!
//! ```text
//! min ½xᵀPx + qᵀx   s.t.  Ax + s = b,  s ∈ K
//! ```
//!
//! Rows are laid out as one zero cone block (equality rows and fixed
//! variables), one nonnegative block (finite sides of the remaining row
//! and variable bounds) and one block per task cone with `-Tx + s = 0`,
//! `T` mapping the cone members onto the engine's cone.

#![allow(non_snake_case)]

use super::problem::ProblemData;
use super::solution::Solution;
use super::types::*;
use crate::algebra::*;
use crate::solver::conic::{ConicSolution, SolverStatus, SupportedConeT};
use std::f64::consts::FRAC_1_SQRT_2;

/// Origin of a row of the standard form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOrigin {
    /// `aᵢx + s = ucᵢ` with `s = 0`
    ConEqual(usize),
    /// `aᵢx + s = ucᵢ`
    ConUpper(usize),
    /// `-aᵢx + s = -lcᵢ`
    ConLower(usize),
    VarFixed(usize),
    VarUpper(usize),
    VarLower(usize),
    Cone,
}

/// A problem in standard form plus the row map back to the task
pub(crate) struct ConicForm {
    pub P: CscMatrix<f64>,
    pub q: Vec<f64>,
    pub A: CscMatrix<f64>,
    pub b: Vec<f64>,
    pub cones: Vec<SupportedConeT<f64>>,
    rows: Vec<RowOrigin>,
    // (row, variable, coefficient) of `s = Tx` for the cone blocks
    cone_map: Vec<(usize, usize, f64)>,
}

// rows of the standard form coming from one task row
#[derive(Default, Clone)]
struct RowSlots {
    equal: Option<usize>,
    upper: Option<usize>,
    lower: Option<usize>,
}

impl ConicForm {
    pub fn new(p: &ProblemData) -> Self {
        let (m, n) = (p.numcon(), p.numvar());
        let mut rows = Vec::new();
        let mut b = Vec::new();
        let mut slots = vec![RowSlots::default(); m];
        let mut var_slots = vec![RowSlots::default(); n];

        // zero block
        for i in 0..m {
            if p.lc[i] == p.uc[i] && p.uc[i].is_finite() {
                slots[i].equal = Some(rows.len());
                rows.push(RowOrigin::ConEqual(i));
                b.push(p.uc[i]);
            }
        }
        for j in 0..n {
            if p.lx[j] == p.ux[j] && p.ux[j].is_finite() {
                var_slots[j].equal = Some(rows.len());
                rows.push(RowOrigin::VarFixed(j));
                b.push(p.ux[j]);
            }
        }
        let nzero = rows.len();

        // nonnegative block
        for i in 0..m {
            if slots[i].equal.is_some() {
                continue;
            }
            if p.uc[i].is_finite() {
                slots[i].upper = Some(rows.len());
                rows.push(RowOrigin::ConUpper(i));
                b.push(p.uc[i]);
            }
            if p.lc[i].is_finite() {
                slots[i].lower = Some(rows.len());
                rows.push(RowOrigin::ConLower(i));
                b.push(-p.lc[i]);
            }
        }
        for j in 0..n {
            if var_slots[j].equal.is_some() {
                continue;
            }
            if p.ux[j].is_finite() {
                var_slots[j].upper = Some(rows.len());
                rows.push(RowOrigin::VarUpper(j));
                b.push(p.ux[j]);
            }
            if p.lx[j].is_finite() {
                var_slots[j].lower = Some(rows.len());
                rows.push(RowOrigin::VarLower(j));
                b.push(-p.lx[j]);
            }
        }
        let nnonneg = rows.len() - nzero;

        let mut cones = Vec::new();
        if nzero > 0 {
            cones.push(SupportedConeT::ZeroConeT(nzero));
        }
        if nnonneg > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(nnonneg));
        }

        // cone blocks
        let mut cone_map = Vec::new();
        for cone in &p.cones {
            let start = rows.len();
            let x = &cone.members;
            let (engine_cone, map) = cone_rows(&cone.ctype, x);
            for (r, j, v) in map {
                cone_map.push((start + r, j, v));
            }
            rows.extend(std::iter::repeat(RowOrigin::Cone).take(x.len()));
            b.extend(std::iter::repeat(0.0).take(x.len()));
            cones.push(engine_cone);
        }

        // constraint matrix in triplet form
        let (mut I, mut J, mut V) = (Vec::new(), Vec::new(), Vec::new());
        let mut push = |i: usize, j: usize, v: f64| {
            I.push(i);
            J.push(j);
            V.push(v);
        };
        for j in 0..n {
            let (ri, rv) = p.A.col(j);
            for (&i, &a) in ri.iter().zip(rv) {
                if let Some(r) = slots[i].equal {
                    push(r, j, a);
                }
                if let Some(r) = slots[i].upper {
                    push(r, j, a);
                }
                if let Some(r) = slots[i].lower {
                    push(r, j, -a);
                }
            }
            if let Some(r) = var_slots[j].equal {
                push(r, j, 1.0);
            }
            if let Some(r) = var_slots[j].upper {
                push(r, j, 1.0);
            }
            if let Some(r) = var_slots[j].lower {
                push(r, j, -1.0);
            }
        }
        for &(r, j, v) in &cone_map {
            push(r, j, -v);
        }
        let A = CscMatrix::new_from_triplets(rows.len(), n, &I, &J, &V);

        let P = match &p.Q {
            Some(Q) => Q.clone(),
            None => CscMatrix::zeros((n, n)),
        };

        Self {
            P,
            q: p.c.clone(),
            A,
            b,
            cones,
            rows,
            cone_map,
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Task duals `(y, slx, sux, snx)` from the engine duals `z`
    fn task_duals(&self, p: &ProblemData, z: &[f64], sol: &mut Solution) {
        let (m, n) = (p.numcon(), p.numvar());
        sol.slc = vec![0.0; m];
        sol.suc = vec![0.0; m];
        sol.slx = vec![0.0; n];
        sol.sux = vec![0.0; n];
        sol.snx = vec![0.0; n];

        for (r, origin) in self.rows.iter().enumerate() {
            let zr = z[r];
            match *origin {
                RowOrigin::ConEqual(i) => {
                    sol.slc[i] += (-zr).max(0.0);
                    sol.suc[i] += zr.max(0.0);
                }
                RowOrigin::ConUpper(i) => sol.suc[i] += zr,
                RowOrigin::ConLower(i) => sol.slc[i] += zr,
                RowOrigin::VarFixed(j) => {
                    sol.slx[j] += (-zr).max(0.0);
                    sol.sux[j] += zr.max(0.0);
                }
                RowOrigin::VarUpper(j) => sol.sux[j] += zr,
                RowOrigin::VarLower(j) => sol.slx[j] += zr,
                RowOrigin::Cone => {}
            }
        }
        for &(r, j, v) in &self.cone_map {
            sol.snx[j] += v * z[r];
        }
        sol.y = sol.slc.iter().zip(&sol.suc).map(|(l, u)| l - u).collect();
    }

    /// Map an engine solution back to a task solution of `p`
    pub fn recover(&self, p: &ProblemData, conic: &ConicSolution<f64>) -> Solution {
        let (m, n) = (p.numcon(), p.numvar());
        let mut sol = Solution::new(n, m);

        match conic.status {
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                self.task_duals(p, &conic.z, &mut sol);
                sol.solsta = SolutionStatus::PrimalInfeasibleCertificate;
                sol.prosta = ProblemStatus::PrimalInfeasible;
                sol.dobj = p.farkas_value(&sol);
                sol.pobj = f64::NAN;
                return sol;
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return p.ray_solution(&conic.x);
            }
            _ => {}
        }

        sol.xx.copy_from_slice(&conic.x);
        sol.xc = p.activities(&sol.xx);
        self.task_duals(p, &conic.z, &mut sol);
        sol.pobj = p.objective(&sol.xx);
        sol.dobj = p.dual_objective(&sol);

        (sol.solsta, sol.prosta) = match conic.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                (SolutionStatus::Optimal, ProblemStatus::PrimalAndDualFeasible)
            }
            _ => {
                let info = p.solution_info(&sol);
                let viol = info
                    .max_pbound_viol
                    .max(info.max_pcon_viol)
                    .max(info.max_pcone_viol);
                if viol <= 1e-6 {
                    (SolutionStatus::PrimalFeasible, ProblemStatus::Unknown)
                } else {
                    (SolutionStatus::Unknown, ProblemStatus::Unknown)
                }
            }
        };
        sol
    }
}

/// The engine cone for a task cone over the variables `x`, and the
/// rows `(row, x[k], coefficient)` of `s = Tx`
fn cone_rows(ctype: &ConeType, x: &[usize]) -> (SupportedConeT<f64>, Vec<(usize, usize, f64)>) {
    let identity = || x.iter().enumerate().map(|(r, &j)| (r, j, 1.0)).collect();
    match *ctype {
        ConeType::Quadratic if x.len() == 1 => (SupportedConeT::NonnegativeConeT(1), identity()),
        ConeType::Quadratic => (SupportedConeT::SecondOrderConeT(x.len()), identity()),
        ConeType::RotatedQuadratic => {
            // (x0+x1)/√2 ≥ ‖((x0-x1)/√2, x2, ...)‖
            let mut map = vec![
                (0, x[0], FRAC_1_SQRT_2),
                (0, x[1], FRAC_1_SQRT_2),
                (1, x[0], FRAC_1_SQRT_2),
                (1, x[1], -FRAC_1_SQRT_2),
            ];
            map.extend(x.iter().enumerate().skip(2).map(|(r, &j)| (r, j, 1.0)));
            (SupportedConeT::SecondOrderConeT(x.len()), map)
        }
        ConeType::PrimalExp => {
            let map = vec![(0, x[2], 1.0), (1, x[1], 1.0), (2, x[0], 1.0)];
            (SupportedConeT::ExponentialConeT(), map)
        }
        ConeType::PrimalPower(α) => (SupportedConeT::PowerConeT(α), identity()),
        ConeType::PsdTriangle(k) => (SupportedConeT::PSDTriangleConeT(k), identity()),
    }
}
