#![allow(non_snake_case)]

use super::errors::DataError;
use super::problem::ProblemData;
use super::types::*;
use super::Task;
use crate::algebra::*;
use crate::env::Env;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The problem as entered by the caller.  Bound values of inactive
/// sides are stored as `∓Env::infinity`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct TaskData {
    pub sense: ObjSense,
    pub c: Vec<f64>,
    pub cfix: f64,
    /// lower triangle of Q as `(i, j, v)` with `i ≥ j`, sorted
    pub qlow: Vec<(usize, usize, f64)>,
    /// columns of A as `(row, value)`, sorted by row
    pub acols: Vec<Vec<(usize, f64)>>,
    pub varbk: Vec<BoundKey>,
    pub blx: Vec<f64>,
    pub bux: Vec<f64>,
    pub vartype: Vec<VariableType>,
    pub conbk: Vec<BoundKey>,
    pub blc: Vec<f64>,
    pub buc: Vec<f64>,
    pub cones: Vec<Cone>,
    /// initial values of an integer solution
    pub xx_init: Vec<Option<f64>>,
}

impl Default for TaskData {
    fn default() -> Self {
        Self {
            sense: ObjSense::Minimize,
            c: Vec::new(),
            cfix: 0.0,
            qlow: Vec::new(),
            acols: Vec::new(),
            varbk: Vec::new(),
            blx: Vec::new(),
            bux: Vec::new(),
            vartype: Vec::new(),
            conbk: Vec::new(),
            blc: Vec::new(),
            buc: Vec::new(),
            cones: Vec::new(),
            xx_init: Vec::new(),
        }
    }
}

/// Normalize the bound values of `key`, checking their consistency
fn checked_bound(
    env: &Env,
    what: &'static str,
    index: usize,
    key: BoundKey,
    lb: f64,
    ub: f64,
) -> Result<(f64, f64), DataError> {
    let inf = env.infinity();
    let finite = |value: f64| {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DataError::NonFiniteBound { what, index, value })
        }
    };
    match key {
        BoundKey::Free => Ok((-inf, inf)),
        BoundKey::Lower => Ok((finite(lb)?, inf)),
        BoundKey::Upper => Ok((-inf, finite(ub)?)),
        BoundKey::Fixed => {
            let (lb, ub) = (finite(lb)?, finite(ub)?);
            if lb != ub {
                return Err(DataError::FixedMismatch { what, index, lb, ub });
            }
            Ok((lb, ub))
        }
        BoundKey::Range => {
            let (lb, ub) = (finite(lb)?, finite(ub)?);
            if lb > ub {
                return Err(DataError::BoundOrder { what, index, lb, ub });
            }
            Ok((lb, ub))
        }
    }
}

// bound values as seen by the engines
fn effective_bound(env: &Env, key: BoundKey, lb: f64, ub: f64) -> (f64, f64) {
    let lower = match key {
        BoundKey::Lower | BoundKey::Range | BoundKey::Fixed if !env.is_infinite(lb) => lb,
        _ => f64::NEG_INFINITY,
    };
    let upper = match key {
        BoundKey::Upper | BoundKey::Range | BoundKey::Fixed if !env.is_infinite(ub) => ub,
        _ => f64::INFINITY,
    };
    (lower, upper)
}

/// Sort by row and sum duplicates
fn normalize_column(mut entries: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    entries.sort_by_key(|&(i, _)| i);
    let mut out: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
    for (i, v) in entries {
        match out.last_mut() {
            Some(last) if last.0 == i => last.1 += v,
            _ => out.push((i, v)),
        }
    }
    out.retain(|&(_, v)| v != 0.0);
    out
}

impl TaskData {
    pub fn numvar(&self) -> usize {
        self.c.len()
    }

    pub fn numcon(&self) -> usize {
        self.conbk.len()
    }

    pub fn check_var(&self, j: usize) -> Result<(), DataError> {
        if j < self.numvar() {
            Ok(())
        } else {
            Err(DataError::VariableIndex(j))
        }
    }

    pub fn check_con(&self, i: usize) -> Result<(), DataError> {
        if i < self.numcon() {
            Ok(())
        } else {
            Err(DataError::ConstraintIndex(i))
        }
    }

    pub(crate) fn check_len(expected: usize, found: usize) -> Result<(), DataError> {
        if expected == found {
            Ok(())
        } else {
            Err(DataError::LengthMismatch { expected, found })
        }
    }

    pub fn append_vars(&mut self, num: usize) -> Range<usize> {
        let first = self.numvar();
        let total = first + num;
        self.c.resize(total, 0.0);
        self.acols.resize(total, Vec::new());
        // new variables are fixed at zero until bounds are given
        self.varbk.resize(total, BoundKey::Fixed);
        self.blx.resize(total, 0.0);
        self.bux.resize(total, 0.0);
        self.vartype.resize(total, VariableType::Continuous);
        self.xx_init.resize(total, None);
        first..total
    }

    pub fn append_cons(&mut self, env: &Env, num: usize) -> Range<usize> {
        let first = self.numcon();
        let total = first + num;
        // new constraints are free
        self.conbk.resize(total, BoundKey::Free);
        self.blc.resize(total, -env.infinity());
        self.buc.resize(total, env.infinity());
        first..total
    }

    pub fn put_var_bound(
        &mut self,
        env: &Env,
        j: usize,
        key: BoundKey,
        lb: f64,
        ub: f64,
    ) -> Result<(), DataError> {
        self.check_var(j)?;
        let (lb, ub) = checked_bound(env, "variable", j, key, lb, ub)?;
        self.varbk[j] = key;
        self.blx[j] = lb;
        self.bux[j] = ub;
        Ok(())
    }

    pub fn put_con_bound(
        &mut self,
        env: &Env,
        i: usize,
        key: BoundKey,
        lb: f64,
        ub: f64,
    ) -> Result<(), DataError> {
        self.check_con(i)?;
        let (lb, ub) = checked_bound(env, "constraint", i, key, lb, ub)?;
        self.conbk[i] = key;
        self.blc[i] = lb;
        self.buc[i] = ub;
        Ok(())
    }

    pub fn put_acol(&mut self, j: usize, rows: &[usize], vals: &[f64]) -> Result<(), DataError> {
        self.check_var(j)?;
        Self::check_len(rows.len(), vals.len())?;
        for (&i, &v) in rows.iter().zip(vals) {
            self.check_con(i)?;
            if !v.is_finite() {
                return Err(DataError::NonFiniteValue { i, j });
            }
        }
        self.acols[j] = normalize_column(rows.iter().copied().zip(vals.iter().copied()).collect());
        Ok(())
    }

    pub fn put_arow(&mut self, i: usize, cols: &[usize], vals: &[f64]) -> Result<(), DataError> {
        self.check_con(i)?;
        Self::check_len(cols.len(), vals.len())?;
        let mut row = vec![0.0; self.numvar()];
        let mut touched = vec![false; self.numvar()];
        for (&j, &v) in cols.iter().zip(vals) {
            self.check_var(j)?;
            if !v.is_finite() {
                return Err(DataError::NonFiniteValue { i, j });
            }
            row[j] += v;
            touched[j] = true;
        }
        for (j, col) in self.acols.iter_mut().enumerate() {
            col.retain(|&(r, _)| r != i);
            if touched[j] && row[j] != 0.0 {
                let pos = col.partition_point(|&(r, _)| r < i);
                col.insert(pos, (i, row[j]));
            }
        }
        Ok(())
    }

    pub fn put_aij(&mut self, i: usize, j: usize, v: f64) -> Result<(), DataError> {
        self.check_con(i)?;
        self.check_var(j)?;
        if !v.is_finite() {
            return Err(DataError::NonFiniteValue { i, j });
        }
        let col = &mut self.acols[j];
        let pos = col.partition_point(|&(r, _)| r < i);
        match col.get_mut(pos) {
            Some(entry) if entry.0 == i => {
                if v == 0.0 {
                    col.remove(pos);
                } else {
                    entry.1 = v;
                }
            }
            _ if v != 0.0 => col.insert(pos, (i, v)),
            _ => {}
        }
        Ok(())
    }

    pub fn get_aij(&self, i: usize, j: usize) -> Result<f64, DataError> {
        self.check_con(i)?;
        self.check_var(j)?;
        let col = &self.acols[j];
        let pos = col.partition_point(|&(r, _)| r < i);
        Ok(match col.get(pos) {
            Some(&(r, v)) if r == i => v,
            _ => 0.0,
        })
    }

    pub fn get_arow(&self, i: usize) -> Result<(Vec<usize>, Vec<f64>), DataError> {
        self.check_con(i)?;
        let mut cols = Vec::new();
        let mut vals = Vec::new();
        for (j, col) in self.acols.iter().enumerate() {
            let pos = col.partition_point(|&(r, _)| r < i);
            if let Some(&(r, v)) = col.get(pos) {
                if r == i {
                    cols.push(j);
                    vals.push(v);
                }
            }
        }
        Ok((cols, vals))
    }

    pub fn put_q(&mut self, subi: &[usize], subj: &[usize], vals: &[f64]) -> Result<(), DataError> {
        Self::check_len(subi.len(), subj.len())?;
        Self::check_len(subi.len(), vals.len())?;
        let mut entries = Vec::with_capacity(subi.len());
        for ((&i, &j), &v) in subi.iter().zip(subj).zip(vals) {
            self.check_var(i)?;
            self.check_var(j)?;
            if i < j {
                return Err(DataError::QuadraticUpperTriangle { i, j });
            }
            if !v.is_finite() {
                return Err(DataError::NonFiniteValue { i, j });
            }
            entries.push((i, j, v));
        }
        entries.sort_by_key(|&(i, j, _)| (i, j));
        let mut out: Vec<(usize, usize, f64)> = Vec::with_capacity(entries.len());
        for (i, j, v) in entries {
            match out.last_mut() {
                Some(last) if (last.0, last.1) == (i, j) => last.2 += v,
                _ => out.push((i, j, v)),
            }
        }
        out.retain(|&(_, _, v)| v != 0.0);
        self.qlow = out;
        Ok(())
    }

    pub fn put_qij(&mut self, i: usize, j: usize, v: f64) -> Result<(), DataError> {
        self.check_var(i)?;
        self.check_var(j)?;
        if i < j {
            return Err(DataError::QuadraticUpperTriangle { i, j });
        }
        if !v.is_finite() {
            return Err(DataError::NonFiniteValue { i, j });
        }
        let pos = self.qlow.partition_point(|&(a, b, _)| (a, b) < (i, j));
        match self.qlow.get_mut(pos) {
            Some(entry) if (entry.0, entry.1) == (i, j) => {
                if v == 0.0 {
                    self.qlow.remove(pos);
                } else {
                    entry.2 = v;
                }
            }
            _ if v != 0.0 => self.qlow.insert(pos, (i, j, v)),
            _ => {}
        }
        Ok(())
    }

    pub fn check_cone(&self, index: usize, cone: &Cone) -> Result<(), DataError> {
        cone.ctype
            .check_dim(cone.members.len())
            .map_err(|reason| DataError::ConeDimension { index, reason })?;
        let mut seen = vec![false; self.numvar()];
        for &j in &cone.members {
            self.check_var(j)?;
            if seen[j] {
                return Err(DataError::DuplicateConeMember { index, var: j });
            }
            seen[j] = true;
        }
        Ok(())
    }

    /// Column-compressed copy of A
    pub fn a_matrix(&self) -> CscMatrix<f64> {
        let (m, n) = (self.numcon(), self.numvar());
        let nnz = self.acols.iter().map(|c| c.len()).sum();
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        colptr.push(0);
        for col in &self.acols {
            for &(i, v) in col {
                rowval.push(i);
                nzval.push(v);
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Full symmetric Q, or `None` without quadratic terms
    pub fn q_matrix(&self) -> Option<CscMatrix<f64>> {
        if self.qlow.is_empty() {
            return None;
        }
        let n = self.numvar();
        let (mut I, mut J, mut V) = (Vec::new(), Vec::new(), Vec::new());
        for &(i, j, v) in &self.qlow {
            I.push(i);
            J.push(j);
            V.push(v);
            if i != j {
                I.push(j);
                J.push(i);
                V.push(v);
            }
        }
        Some(CscMatrix::new_from_triplets(n, n, &I, &J, &V))
    }

    /// The problem in minimization form, after checking all data again
    pub fn to_problem(&self, env: &Env) -> Result<ProblemData, DataError> {
        let (m, n) = (self.numcon(), self.numvar());
        let mut lx = vec![0.0; n];
        let mut ux = vec![0.0; n];
        for j in 0..n {
            let (l, u) = checked_bound(env, "variable", j, self.varbk[j], self.blx[j], self.bux[j])?;
            (lx[j], ux[j]) = effective_bound(env, self.varbk[j], l, u);
        }
        let mut lc = vec![0.0; m];
        let mut uc = vec![0.0; m];
        for i in 0..m {
            let (l, u) = checked_bound(env, "constraint", i, self.conbk[i], self.blc[i], self.buc[i])?;
            (lc[i], uc[i]) = effective_bound(env, self.conbk[i], l, u);
        }
        for (k, cone) in self.cones.iter().enumerate() {
            self.check_cone(k, cone)?;
        }

        let sign = match self.sense {
            ObjSense::Minimize => 1.0,
            ObjSense::Maximize => -1.0,
        };
        let c: Vec<f64> = self.c.iter().map(|&v| sign * v).collect();
        let Q = self.q_matrix().map(|mut Q| {
            Q.nzval.iter_mut().for_each(|v| *v *= sign);
            Q
        });

        Ok(ProblemData {
            A: self.a_matrix(),
            c,
            cfix: sign * self.cfix,
            Q,
            lc,
            uc,
            lx,
            ux,
            cones: self.cones.clone(),
            integer: self
                .vartype
                .iter()
                .map(|&t| t == VariableType::Integer)
                .collect(),
        })
    }
}

// ---------------------------------
// builder operations of the task
// ---------------------------------

impl<'env> Task<'env> {
    pub fn get_num_var(&self) -> usize {
        self.data.numvar()
    }

    pub fn get_num_con(&self) -> usize {
        self.data.numcon()
    }

    pub fn get_num_cone(&self) -> usize {
        self.data.cones.len()
    }

    /// number of stored nonzeros of A
    pub fn get_num_a_nz(&self) -> usize {
        self.data.acols.iter().map(|c| c.len()).sum()
    }

    /// Append `num` variables, fixed at zero, returning their indices
    pub fn append_vars(&mut self, num: usize) -> Result<Range<usize>, DataError> {
        self.invalidate_structure();
        Ok(self.data.append_vars(num))
    }

    /// Append `num` free constraints, returning their indices
    pub fn append_cons(&mut self, num: usize) -> Result<Range<usize>, DataError> {
        self.invalidate_structure();
        Ok(self.data.append_cons(self.env, num))
    }

    pub fn put_var_bound(&mut self, j: usize, key: BoundKey, lb: f64, ub: f64) -> Result<(), DataError> {
        self.data.put_var_bound(self.env, j, key, lb, ub)?;
        self.invalidate_values();
        Ok(())
    }

    pub fn put_con_bound(&mut self, i: usize, key: BoundKey, lb: f64, ub: f64) -> Result<(), DataError> {
        self.data.put_con_bound(self.env, i, key, lb, ub)?;
        self.invalidate_values();
        Ok(())
    }

    /// Bounds of variables `first..last`.  All or nothing.
    pub fn put_var_bound_slice(
        &mut self,
        first: usize,
        last: usize,
        keys: &[BoundKey],
        lb: &[f64],
        ub: &[f64],
    ) -> Result<(), DataError> {
        let mut data = self.data.clone();
        check_slice(first, last, data.numvar(), DataError::VariableIndex)?;
        for (k, j) in (first..last).enumerate() {
            let (key, l, u) = slice_entry(keys, lb, ub, k, last - first)?;
            data.put_var_bound(self.env, j, key, l, u)?;
        }
        self.data = data;
        self.invalidate_values();
        Ok(())
    }

    /// Bounds of constraints `first..last`.  All or nothing.
    pub fn put_con_bound_slice(
        &mut self,
        first: usize,
        last: usize,
        keys: &[BoundKey],
        lb: &[f64],
        ub: &[f64],
    ) -> Result<(), DataError> {
        let mut data = self.data.clone();
        check_slice(first, last, data.numcon(), DataError::ConstraintIndex)?;
        for (k, i) in (first..last).enumerate() {
            let (key, l, u) = slice_entry(keys, lb, ub, k, last - first)?;
            data.put_con_bound(self.env, i, key, l, u)?;
        }
        self.data = data;
        self.invalidate_values();
        Ok(())
    }

    pub fn get_var_bound(&self, j: usize) -> Result<(BoundKey, f64, f64), DataError> {
        self.data.check_var(j)?;
        Ok((self.data.varbk[j], self.data.blx[j], self.data.bux[j]))
    }

    pub fn get_con_bound(&self, i: usize) -> Result<(BoundKey, f64, f64), DataError> {
        self.data.check_con(i)?;
        Ok((self.data.conbk[i], self.data.blc[i], self.data.buc[i]))
    }

    pub fn put_cj(&mut self, j: usize, value: f64) -> Result<(), DataError> {
        self.data.check_var(j)?;
        if !value.is_finite() {
            return Err(DataError::NonFiniteValue { i: 0, j });
        }
        self.data.c[j] = value;
        self.invalidate_values();
        Ok(())
    }

    pub fn put_c_slice(&mut self, first: usize, last: usize, values: &[f64]) -> Result<(), DataError> {
        check_slice(first, last, self.data.numvar(), DataError::VariableIndex)?;
        TaskData::check_len(last - first, values.len())?;
        if let Some(k) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFiniteValue { i: 0, j: first + k });
        }
        self.data.c[first..last].copy_from_slice(values);
        self.invalidate_values();
        Ok(())
    }

    pub fn get_c(&self) -> &[f64] {
        &self.data.c
    }

    pub fn put_cfix(&mut self, cfix: f64) -> Result<(), DataError> {
        if !cfix.is_finite() {
            return Err(DataError::NonFiniteValue { i: 0, j: 0 });
        }
        self.data.cfix = cfix;
        self.invalidate_values();
        Ok(())
    }

    pub fn get_cfix(&self) -> f64 {
        self.data.cfix
    }

    pub fn put_obj_sense(&mut self, sense: ObjSense) {
        self.data.sense = sense;
        self.invalidate_values();
    }

    pub fn get_obj_sense(&self) -> ObjSense {
        self.data.sense
    }

    /// Replace the quadratic objective terms.  Entries are given in
    /// the lower triangle (`subi[k] ≥ subj[k]`) and duplicates are
    /// summed.
    pub fn put_q_obj(&mut self, subi: &[usize], subj: &[usize], vals: &[f64]) -> Result<(), DataError> {
        self.data.put_q(subi, subj, vals)?;
        self.invalidate_structure();
        Ok(())
    }

    /// Set a single lower triangular entry of Q
    pub fn put_q_obj_ij(&mut self, i: usize, j: usize, value: f64) -> Result<(), DataError> {
        self.data.put_qij(i, j, value)?;
        self.invalidate_structure();
        Ok(())
    }

    /// Lower triangle of Q as `(subi, subj, vals)`
    pub fn get_q_obj(&self) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        let q = &self.data.qlow;
        (
            q.iter().map(|e| e.0).collect(),
            q.iter().map(|e| e.1).collect(),
            q.iter().map(|e| e.2).collect(),
        )
    }

    pub fn put_aij(&mut self, i: usize, j: usize, value: f64) -> Result<(), DataError> {
        self.data.put_aij(i, j, value)?;
        self.invalidate_structure();
        Ok(())
    }

    /// Replace column `j` of A.  Duplicate row indices are summed.
    pub fn put_acol(&mut self, j: usize, rows: &[usize], vals: &[f64]) -> Result<(), DataError> {
        self.data.put_acol(j, rows, vals)?;
        self.invalidate_structure();
        Ok(())
    }

    /// Replace row `i` of A.  Duplicate column indices are summed.
    pub fn put_arow(&mut self, i: usize, cols: &[usize], vals: &[f64]) -> Result<(), DataError> {
        self.data.put_arow(i, cols, vals)?;
        self.invalidate_structure();
        Ok(())
    }

    pub fn get_aij(&self, i: usize, j: usize) -> Result<f64, DataError> {
        self.data.get_aij(i, j)
    }

    pub fn get_acol(&self, j: usize) -> Result<(Vec<usize>, Vec<f64>), DataError> {
        self.data.check_var(j)?;
        let col = &self.data.acols[j];
        Ok((col.iter().map(|e| e.0).collect(), col.iter().map(|e| e.1).collect()))
    }

    pub fn get_arow(&self, i: usize) -> Result<(Vec<usize>, Vec<f64>), DataError> {
        self.data.get_arow(i)
    }

    /// Append a cone over `members`, returning its index
    pub fn append_cone(&mut self, ctype: ConeType, members: &[usize]) -> Result<usize, DataError> {
        let cone = Cone {
            ctype,
            members: members.to_vec(),
        };
        let index = self.data.cones.len();
        self.data.check_cone(index, &cone)?;
        self.data.cones.push(cone);
        self.invalidate_structure();
        Ok(index)
    }

    /// Remove the cones at `indices`.  Later cones move down.
    pub fn remove_cones(&mut self, indices: &[usize]) -> Result<(), DataError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if let Some(&k) = sorted.iter().find(|&&k| k >= self.data.cones.len()) {
            return Err(DataError::ConeIndex(k));
        }
        for &k in sorted.iter().rev() {
            self.data.cones.remove(k);
        }
        self.invalidate_structure();
        Ok(())
    }

    pub fn get_cone(&self, k: usize) -> Result<&Cone, DataError> {
        self.data.cones.get(k).ok_or(DataError::ConeIndex(k))
    }

    pub fn put_var_type(&mut self, j: usize, vartype: VariableType) -> Result<(), DataError> {
        self.data.check_var(j)?;
        self.data.vartype[j] = vartype;
        self.invalidate_values();
        Ok(())
    }

    pub fn put_var_type_list(&mut self, subj: &[usize], types: &[VariableType]) -> Result<(), DataError> {
        TaskData::check_len(subj.len(), types.len())?;
        for &j in subj {
            self.data.check_var(j)?;
        }
        for (&j, &t) in subj.iter().zip(types) {
            self.data.vartype[j] = t;
        }
        self.invalidate_values();
        Ok(())
    }

    pub fn get_var_type(&self, j: usize) -> Result<VariableType, DataError> {
        self.data.check_var(j)?;
        Ok(self.data.vartype[j])
    }

    /// Store values `first..last` of an initial integer solution.  Only
    /// [`SolutionType::Integer`] is accepted.
    pub fn put_xx_slice(
        &mut self,
        whichsol: SolutionType,
        first: usize,
        last: usize,
        values: &[f64],
    ) -> Result<(), DataError> {
        if whichsol != SolutionType::Integer {
            return Err(DataError::BadSolutionType);
        }
        check_slice(first, last, self.data.numvar(), DataError::VariableIndex)?;
        TaskData::check_len(last - first, values.len())?;
        for (j, &v) in (first..last).zip(values) {
            if !v.is_finite() {
                return Err(DataError::NonFiniteValue { i: 0, j });
            }
            self.data.xx_init[j] = Some(v);
        }
        Ok(())
    }

    /// Enter a whole linear problem at once, from A in column form
    /// given by `ptrb`, `ptre`, `asub` and `aval`.  Variables and
    /// constraints are appended as needed to reach `numvar` and
    /// `numcon`.  All or nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn input_data(
        &mut self,
        numcon: usize,
        numvar: usize,
        c: &[f64],
        cfix: f64,
        ptrb: &[usize],
        ptre: &[usize],
        asub: &[usize],
        aval: &[f64],
        bkc: &[BoundKey],
        blc: &[f64],
        buc: &[f64],
        bkx: &[BoundKey],
        blx: &[f64],
        bux: &[f64],
    ) -> Result<(), DataError> {
        for len in [c.len(), ptrb.len(), ptre.len(), bkx.len(), blx.len(), bux.len()] {
            TaskData::check_len(numvar, len)?;
        }
        for len in [bkc.len(), blc.len(), buc.len()] {
            TaskData::check_len(numcon, len)?;
        }
        TaskData::check_len(asub.len(), aval.len())?;

        let mut data = self.data.clone();
        if data.numvar() < numvar {
            data.append_vars(numvar - data.numvar());
        }
        if data.numcon() < numcon {
            data.append_cons(self.env, numcon - data.numcon());
        }
        if !cfix.is_finite() {
            return Err(DataError::NonFiniteValue { i: 0, j: 0 });
        }
        data.cfix = cfix;
        for j in 0..numvar {
            if !c[j].is_finite() {
                return Err(DataError::NonFiniteValue { i: 0, j });
            }
            data.c[j] = c[j];
            let (b, e) = (ptrb[j], ptre[j]);
            if b > e || e > asub.len() {
                return Err(DataError::BadColumnPointers(j));
            }
            data.put_acol(j, &asub[b..e], &aval[b..e])?;
            data.put_var_bound(self.env, j, bkx[j], blx[j], bux[j])?;
        }
        for i in 0..numcon {
            data.put_con_bound(self.env, i, bkc[i], blc[i], buc[i])?;
        }
        self.data = data;
        self.invalidate_structure();
        Ok(())
    }

    /// [`input_data`](Self::input_data) with A given as dense rows
    #[allow(clippy::too_many_arguments)]
    pub fn input_data_dense(
        &mut self,
        c: &[f64],
        cfix: f64,
        rows: &[Vec<f64>],
        bkc: &[BoundKey],
        blc: &[f64],
        buc: &[f64],
        bkx: &[BoundKey],
        blx: &[f64],
        bux: &[f64],
    ) -> Result<(), DataError> {
        let numvar = c.len();
        for row in rows {
            TaskData::check_len(numvar, row.len())?;
        }
        let (mut ptrb, mut ptre, mut asub, mut aval) = (vec![], vec![], vec![], vec![]);
        for j in 0..numvar {
            ptrb.push(asub.len());
            for (i, row) in rows.iter().enumerate() {
                if row[j] != 0.0 {
                    asub.push(i);
                    aval.push(row[j]);
                }
            }
            ptre.push(asub.len());
        }
        self.input_data(
            rows.len(),
            numvar,
            c,
            cfix,
            &ptrb,
            &ptre,
            &asub,
            &aval,
            bkc,
            blc,
            buc,
            bkx,
            blx,
            bux,
        )
    }
}

fn check_slice(
    first: usize,
    last: usize,
    len: usize,
    err: fn(usize) -> DataError,
) -> Result<(), DataError> {
    if first > last {
        return Err(err(first));
    }
    if last > len {
        return Err(err(last - 1));
    }
    Ok(())
}

fn slice_entry(
    keys: &[BoundKey],
    lb: &[f64],
    ub: &[f64],
    k: usize,
    len: usize,
) -> Result<(BoundKey, f64, f64), DataError> {
    for found in [keys.len(), lb.len(), ub.len()] {
        TaskData::check_len(len, found)?;
    }
    Ok((keys[k], lb[k], ub[k]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validation() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.append_vars(2).unwrap();
        task.append_cons(1).unwrap();

        assert!(matches!(
            task.put_var_bound(0, BoundKey::Range, 2.0, 1.0),
            Err(DataError::BoundOrder { index: 0, .. })
        ));
        assert!(matches!(
            task.put_var_bound(1, BoundKey::Fixed, 1.0, 2.0),
            Err(DataError::FixedMismatch { index: 1, .. })
        ));
        assert!(matches!(
            task.put_con_bound(0, BoundKey::Lower, f64::NAN, 0.0),
            Err(DataError::NonFiniteBound { .. })
        ));
        assert!(matches!(
            task.put_var_bound(5, BoundKey::Free, 0.0, 0.0),
            Err(DataError::VariableIndex(5))
        ));

        // inactive sides are ignored
        task.put_var_bound(0, BoundKey::Lower, 1.0, f64::NAN).unwrap();
        let (bk, lb, ub) = task.get_var_bound(0).unwrap();
        assert_eq!((bk, lb), (BoundKey::Lower, 1.0));
        assert!(env.is_infinite(ub));

        // a failing slice leaves everything unchanged
        let before = task.data.clone();
        let r = task.put_var_bound_slice(
            0,
            2,
            &[BoundKey::Free, BoundKey::Range],
            &[0.0, 3.0],
            &[0.0, 1.0],
        );
        assert!(r.is_err());
        assert_eq!(task.data, before);
    }

    #[test]
    fn test_matrix_edits() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.append_vars(3).unwrap();
        task.append_cons(2).unwrap();

        task.put_acol(0, &[1, 0, 1], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(task.get_acol(0).unwrap(), (vec![0, 1], vec![2.0, 4.0]));

        task.put_arow(1, &[2, 1], &[5.0, 6.0]).unwrap();
        assert_eq!(task.get_arow(1).unwrap(), (vec![1, 2], vec![6.0, 5.0]));
        assert_eq!(task.get_aij(1, 0).unwrap(), 0.0);
        assert_eq!(task.get_aij(0, 0).unwrap(), 2.0);

        task.put_aij(0, 2, 7.0).unwrap();
        task.put_aij(0, 0, 0.0).unwrap();
        assert_eq!(task.get_acol(2).unwrap(), (vec![0, 1], vec![7.0, 5.0]));
        assert_eq!(task.get_num_a_nz(), 3);

        assert!(matches!(task.put_aij(2, 0, 1.0), Err(DataError::ConstraintIndex(2))));
        assert!(matches!(
            task.put_acol(0, &[0], &[1.0, 2.0]),
            Err(DataError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_quadratic_and_cones() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.append_vars(3).unwrap();

        assert!(matches!(
            task.put_q_obj(&[0], &[1], &[1.0]),
            Err(DataError::QuadraticUpperTriangle { i: 0, j: 1 })
        ));
        task.put_q_obj(&[0, 2, 2], &[0, 0, 0], &[2.0, -1.0, 0.5]).unwrap();
        assert_eq!(task.get_q_obj(), (vec![0, 2], vec![0, 0], vec![2.0, -0.5]));
        let Q = task.data.q_matrix().unwrap();
        assert_eq!(Q.get_entry((0, 2)), Some(-0.5));
        assert_eq!(Q.get_entry((2, 0)), Some(-0.5));

        assert!(matches!(
            task.append_cone(ConeType::PrimalExp, &[0, 1]),
            Err(DataError::ConeDimension { index: 0, .. })
        ));
        assert!(matches!(
            task.append_cone(ConeType::Quadratic, &[0, 0]),
            Err(DataError::DuplicateConeMember { var: 0, .. })
        ));
        assert_eq!(task.append_cone(ConeType::Quadratic, &[0, 1, 2]).unwrap(), 0);
        assert_eq!(task.append_cone(ConeType::RotatedQuadratic, &[2, 1, 0]).unwrap(), 1);
        task.remove_cones(&[0]).unwrap();
        assert_eq!(task.get_num_cone(), 1);
        assert_eq!(task.get_cone(0).unwrap().ctype, ConeType::RotatedQuadratic);
        assert!(task.remove_cones(&[3]).is_err());
    }

    #[test]
    fn test_input_data_and_problem_form() {
        let env = Env::new();
        let mut task = Task::new(&env);
        task.input_data_dense(
            &[1.0, 2.0],
            0.5,
            &[vec![1.0, 1.0]],
            &[BoundKey::Lower],
            &[1.0],
            &[0.0],
            &[BoundKey::Lower, BoundKey::Range],
            &[0.0, 0.0],
            &[0.0, 1e30],
        )
        .unwrap();
        task.put_obj_sense(ObjSense::Maximize);

        let p = task.data.to_problem(&env).unwrap();
        assert_eq!(p.c, vec![-1.0, -2.0]);
        assert_eq!(p.cfix, -0.5);
        assert_eq!(p.lc, vec![1.0]);
        assert_eq!(p.uc, vec![f64::INFINITY]);
        // a range side at the infinity threshold is infinite
        assert_eq!(p.ux[1], f64::INFINITY);
        assert_eq!(p.A.nnz(), 2);

        assert!(task.put_xx_slice(SolutionType::Basic, 0, 1, &[1.0]).is_err());
        task.put_xx_slice(SolutionType::Integer, 0, 2, &[1.0, 0.0]).unwrap();
        assert_eq!(task.data.xx_init, vec![Some(1.0), Some(0.0)]);
    }
}
