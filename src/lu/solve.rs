#![allow(non_snake_case)]
use super::factor::*;
use crate::algebra::*;

impl<T> SparseLU<T>
where
    T: FloatT,
{
    /// Solves `Ax = b` in place
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.n);
        let y = &mut self.work.y;
        for (i, &bi) in b.iter().enumerate() {
            y[self.pinv[i]] = bi;
        }
        solve_in_order(&self.L, None, y, 0..self.n);
        solve_in_order(&self.U, Some(&self.Udiag), y, (0..self.n).rev());
        for (k, &yk) in y.iter().enumerate() {
            b[self.q[k]] = yk;
        }
    }

    /// Solves `A'x = b` in place
    pub fn solve_transpose(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.n);
        let y = &mut self.work.y;
        for (k, yk) in y.iter_mut().enumerate() {
            *yk = b[self.q[k]];
        }
        solve_in_order(&self.Ut, Some(&self.Udiag), y, 0..self.n);
        solve_in_order(&self.Lt, None, y, (0..self.n).rev());
        for (i, bi) in b.iter_mut().enumerate() {
            *bi = y[self.pinv[i]];
        }
    }

    /// Solves `Ax = b` (or `A'x = b` if `transpose`) for a sparse
    /// right-hand side.  Only entries reachable from the pattern of
    /// `b` in the graphs of the factors are touched, and the result
    /// holds exactly those entries.
    pub fn solve_sparse(&mut self, b: &SparseVector<T>, transpose: bool) -> SparseVector<T> {
        assert_eq!(b.n, self.n);

        // map b into the factor numbering
        let (first, first_diag, second, second_diag) = if transpose {
            (&self.Ut, Some(&self.Udiag[..]), &self.Lt, None)
        } else {
            (&self.L, None, &self.U, Some(&self.Udiag[..]))
        };
        let seeds: Vec<usize> = if transpose {
            b.index.iter().map(|&i| self.qinv[i]).collect()
        } else {
            b.index.iter().map(|&i| self.pinv[i]).collect()
        };

        let work = &mut self.work;
        for (&s, &v) in seeds.iter().zip(&b.values) {
            work.y[s] += v;
        }

        reach(first, &seeds, work);
        let pattern = std::mem::take(&mut work.xi);
        solve_in_order(first, first_diag, &mut work.y, pattern.iter().copied());

        reach(second, &pattern, work);
        let pattern = std::mem::take(&mut work.xi);
        solve_in_order(second, second_diag, &mut work.y, pattern.iter().copied());

        let mut x = SparseVector::new(self.n);
        for &k in &pattern {
            let orig = if transpose { self.p[k] } else { self.q[k] };
            x.push(orig, work.y[k]);
            work.y[k] = T::zero();
        }
        work.xi = pattern;
        x.sort();
        x
    }
}

// Column oriented triangular solve over the columns in `order`,
// which must be a topological order of the dependency graph.
fn solve_in_order<T: FloatT>(
    M: &CscMatrix<T>,
    diag: Option<&[T]>,
    x: &mut [T],
    order: impl Iterator<Item = usize>,
) {
    for j in order {
        if let Some(d) = diag {
            x[j] /= d[j];
        }
        let xj = x[j];
        if xj == T::zero() {
            continue;
        }
        let (rows, vals) = M.col(j);
        for (&r, &v) in rows.iter().zip(vals) {
            x[r] -= v * xj;
        }
    }
}

// Nodes reachable from `seeds` in the graph of `M` (j -> rows of
// column j), in topological order.
fn reach<T: FloatT>(M: &CscMatrix<T>, seeds: &[usize], work: &mut LuWorkspace<T>) {
    work.xi.clear();
    for &s in seeds {
        if work.marks[s] {
            continue;
        }
        work.marks[s] = true;
        work.stack.push((s, 0));
        while let Some(&(j, next)) = work.stack.last() {
            let rows = M.col(j).0;
            let mut p = next;
            while p < rows.len() && work.marks[rows[p]] {
                p += 1;
            }
            if p < rows.len() {
                let i = rows[p];
                if let Some(top) = work.stack.last_mut() {
                    top.1 = p + 1;
                }
                work.marks[i] = true;
                work.stack.push((i, 0));
            } else {
                work.stack.pop();
                work.xi.push(j);
            }
        }
    }
    work.xi.reverse();
    for &i in &work.xi {
        work.marks[i] = false;
    }
}
