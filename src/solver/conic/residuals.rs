#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;

/// Residuals of the homogeneous embedding at the current iterate
pub struct ConicResiduals<T> {
    // the main KKT residuals
    pub rx: Vec<T>,
    pub rz: Vec<T>,
    pub rτ: T,

    // partial residuals for infeasibility checks
    pub rx_inf: Vec<T>,
    pub rz_inf: Vec<T>,

    // inner products, invariant w.r.t equilibration
    pub dot_qx: T,
    pub dot_bz: T,
    pub dot_sz: T,
    pub dot_xPx: T,

    // Px, needed for the infeasibility checks
    pub Px: Vec<T>,
}

impl<T> ConicResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            rx: vec![T::zero(); n],
            rz: vec![T::zero(); m],
            rτ: T::one(),
            rx_inf: vec![T::zero(); n],
            rz_inf: vec![T::zero(); m],
            Px: vec![T::zero(); n],
            dot_qx: T::zero(),
            dot_bz: T::zero(),
            dot_sz: T::zero(),
            dot_xPx: T::zero(),
        }
    }

    pub(crate) fn update(&mut self, variables: &ConicVariables<T>, data: &ConicProblemData<T>) {
        let qx = data.q.dot(&variables.x);
        let bz = data.b.dot(&variables.z);
        let sz = variables.s.dot(&variables.z);

        // Px = P*x, P treated as symmetric
        data.P.sym().symv(&mut self.Px, &variables.x, T::one(), T::zero());

        let xPx = variables.x.dot(&self.Px);

        // rx_inf = -A'z
        data.A.t().gemv(&mut self.rx_inf, &variables.z, -T::one(), T::zero());

        // rz_inf = Ax + s
        self.rz_inf.copy_from(&variables.s);
        data.A.gemv(&mut self.rz_inf, &variables.x, T::one(), T::one());

        // rx = rx_inf - Px - qτ
        self.rx.waxpby(-T::one(), &self.Px, -variables.τ, &data.q);
        self.rx.axpby(T::one(), &self.rx_inf, T::one());

        // rz = rz_inf - bτ
        self.rz.waxpby(T::one(), &self.rz_inf, -variables.τ, &data.b);

        // rτ = qx + bz + κ + xPx/τ
        self.rτ = qx + bz + variables.κ + xPx / variables.τ;

        self.dot_qx = qx;
        self.dot_bz = bz;
        self.dot_sz = sz;
        self.dot_xPx = xPx;
    }
}
