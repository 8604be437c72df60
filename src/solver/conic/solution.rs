use super::*;
use crate::algebra::*;

/// Solution of a problem in the engine's standard form
#[derive(Debug, Clone)]
pub struct ConicSolution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// dual solution (in dual cone)
    pub z: Vec<T>,
    /// vector of slacks (in primal cone)
    pub s: Vec<T>,
    pub status: SolverStatus,
    pub obj_val: T,
    pub obj_val_dual: T,
    /// solve time in seconds
    pub solve_time: f64,
    pub iterations: u32,
    pub r_prim: T,
    pub r_dual: T,
}

impl<T> ConicSolution<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            s: vec![T::zero(); m],
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            obj_val_dual: T::nan(),
            solve_time: 0f64,
            iterations: 0,
            r_prim: T::nan(),
            r_dual: T::nan(),
        }
    }

    pub(crate) fn post_process(
        &mut self,
        data: &ConicProblemData<T>,
        variables: &mut ConicVariables<T>,
        info: &ConicInfo<T>,
    ) {
        self.status = info.status;
        let is_infeasible = info.status.is_infeasible();

        if is_infeasible {
            self.obj_val = T::nan();
            self.obj_val_dual = T::nan();
        } else {
            self.obj_val = info.cost_primal;
            self.obj_val_dual = info.cost_dual;
        }

        self.iterations = info.iterations;
        self.r_prim = info.res_primal;
        self.r_dual = info.res_dual;

        variables.unscale(data, is_infeasible);

        self.x.copy_from(&variables.x);
        self.z.copy_from(&variables.z);
        self.s.copy_from(&variables.s);
    }

    pub(crate) fn finalize(&mut self, info: &ConicInfo<T>) {
        self.solve_time = info.solve_time;
    }
}
