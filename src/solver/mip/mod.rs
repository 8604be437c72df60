//! Branch-and-bound over continuous relaxations.
//!
//! The tree only manipulates variable bounds.  Relaxations are solved
//! by a caller supplied closure, which lets the same search drive the
//! simplex (warm-started from the parent basis) or the interior point
//! engine.

use super::callbacks::{CallbackCode, Progress, SolverCallbacks};
use super::simplex::VarStatus;
use super::TerminationCode;
use derive_builder::Builder;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Order in which open nodes are processed
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum NodeOrder {
    /// smallest parent bound first
    #[default]
    BestBound,
    /// most recently created first
    DepthFirst,
}

/// Branch-and-bound settings
#[derive(Builder, Debug, Clone)]
pub struct MipSettings {
    #[builder(default = "NodeOrder::BestBound")]
    pub node_order: NodeOrder,

    /// maximum number of relaxations solved in the tree
    #[builder(default = "None")]
    pub max_nodes: Option<usize>,

    /// wall clock limit in seconds
    #[builder(default = "f64::INFINITY")]
    pub max_time: f64,

    /// distance to the nearest integer accepted as integral
    #[builder(default = "1e-5")]
    pub tol_int: f64,

    #[builder(default = "1e-4")]
    pub tol_rel_gap: f64,

    #[builder(default = "0.0")]
    pub tol_abs_gap: f64,

    /// build a first incumbent from the initial integer values
    #[builder(default = "true")]
    pub construct_sol: bool,

    /// perturbs tie breaking between branching candidates
    #[builder(default = "0")]
    pub seed: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        MipSettingsBuilder::default().build().unwrap()
    }
}

/// Outcome of one relaxation solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// the relaxation solve gave no usable answer
    Failed,
    /// a limit or the callback stopped the relaxation solve
    Stopped(TerminationCode),
}

/// A solved relaxation as returned by the closure
#[derive(Debug, Clone)]
pub struct Relaxation {
    pub status: RelaxationStatus,
    pub x: Vec<f64>,
    pub obj: f64,
    /// final basis, handed to the children as warm start
    pub basis: Option<Vec<VarStatus>>,
}

impl Relaxation {
    pub fn with_status(status: RelaxationStatus) -> Self {
        Self {
            status,
            x: Vec::new(),
            obj: f64::NAN,
            basis: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// the tree was exhausted with an incumbent
    Optimal,
    /// stopped by a limit with an incumbent
    Feasible,
    /// the tree was exhausted without an incumbent
    Infeasible,
    /// an unbounded relaxation was found
    Unbounded,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct MipResult {
    pub status: MipStatus,
    pub termination: TerminationCode,
    /// best integer solution and its objective
    pub incumbent: Option<(Vec<f64>, f64)>,
    /// lower bound on the optimal objective
    pub bound: f64,
    pub nodes: usize,
    pub num_int_solutions: usize,
    /// objective of the solution constructed from the initial values
    pub construct_obj: Option<f64>,
    /// status of the root relaxation
    pub root_status: Option<RelaxationStatus>,
}

impl MipResult {
    pub fn abs_gap(&self) -> f64 {
        match &self.incumbent {
            Some((_, obj)) => (obj - self.bound).max(0.0),
            None => f64::NAN,
        }
    }

    pub fn rel_gap(&self) -> f64 {
        match &self.incumbent {
            Some((_, obj)) => self.abs_gap() / obj.abs().max(1.0),
            None => f64::NAN,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    lx: Vec<f64>,
    ux: Vec<f64>,
    // objective of the parent relaxation
    bound: f64,
    depth: usize,
    id: usize,
    warm: Option<Vec<VarStatus>>,
}

// ordered for a max-heap that pops the smallest bound, oldest first
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

enum NodeQueue {
    Best(BinaryHeap<Node>),
    Depth(Vec<Node>),
}

impl NodeQueue {
    fn new(order: NodeOrder) -> Self {
        match order {
            NodeOrder::BestBound => NodeQueue::Best(BinaryHeap::new()),
            NodeOrder::DepthFirst => NodeQueue::Depth(Vec::new()),
        }
    }

    fn push(&mut self, node: Node) {
        match self {
            NodeQueue::Best(h) => h.push(node),
            NodeQueue::Depth(v) => v.push(node),
        }
    }

    fn pop(&mut self) -> Option<Node> {
        match self {
            NodeQueue::Best(h) => h.pop(),
            NodeQueue::Depth(v) => v.pop(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            NodeQueue::Best(h) => h.is_empty(),
            NodeQueue::Depth(v) => v.is_empty(),
        }
    }

    fn min_bound(&self) -> f64 {
        match self {
            NodeQueue::Best(h) => h.peek().map_or(f64::INFINITY, |n| n.bound),
            NodeQueue::Depth(v) => v.iter().map(|n| n.bound).fold(f64::INFINITY, f64::min),
        }
    }
}

/// Index of the integer variable of `x` farthest from an integer, if
/// any exceeds `tol`.  Ties go to the first index in an order rotated
/// by `seed`.
pub fn most_fractional(x: &[f64], integer: &[bool], tol: f64, seed: u64) -> Option<usize> {
    let n = x.len();
    if n == 0 {
        return None;
    }
    let offset = (seed as usize) % n;
    let mut best: Option<(usize, f64)> = None;
    for k in 0..n {
        let j = (k + offset) % n;
        if !integer[j] {
            continue;
        }
        let frac = x[j] - x[j].floor();
        let dist = frac.min(1.0 - frac);
        if dist > tol && best.map_or(true, |(_, d)| dist > d) {
            best = Some((j, dist));
        }
    }
    best.map(|(j, _)| j)
}

/// Run branch-and-bound for the integer variables flagged in `integer`
/// over the root bounds `lx`, `ux`.
///
/// `solve(lx, ux, warm, callbacks)` solves the continuous relaxation
/// with the given variable bounds.  `initial` holds starting values of
/// the integer variables used to construct a first incumbent.
pub(crate) fn branch_and_bound<'cb, F, E>(
    integer: &[bool],
    lx: &[f64],
    ux: &[f64],
    initial: Option<&[f64]>,
    settings: &MipSettings,
    callbacks: &mut SolverCallbacks<'cb>,
    mut solve: F,
) -> Result<MipResult, E>
where
    F: FnMut(&[f64], &[f64], Option<&[VarStatus]>, &mut SolverCallbacks<'cb>) -> Result<Relaxation, E>,
{
    let mut result = MipResult {
        status: MipStatus::Unknown,
        termination: TerminationCode::Ok,
        incumbent: None,
        bound: f64::NEG_INFINITY,
        nodes: 0,
        num_int_solutions: 0,
        construct_obj: None,
        root_status: None,
    };

    if settings.construct_sol {
        if let Some(init) = initial {
            construct_incumbent(integer, lx, ux, init, settings, callbacks, &mut solve, &mut result)?;
        }
    }

    let mut queue = NodeQueue::new(settings.node_order);
    let mut next_id = 1;
    queue.push(Node {
        lx: lx.to_vec(),
        ux: ux.to_vec(),
        bound: f64::NEG_INFINITY,
        depth: 0,
        id: 0,
        warm: None,
    });

    // nodes dropped without a proof
    let mut incomplete = false;
    let mut unbounded = false;

    while let Some(node) = queue.pop() {
        if callbacks.is_terminated() {
            result.termination = TerminationCode::UserCallback;
        } else if settings.max_nodes.map_or(false, |k| result.nodes >= k) {
            result.termination = TerminationCode::MioMaxNodes;
        } else if callbacks.elapsed() > settings.max_time {
            result.termination = TerminationCode::MaxTime;
        }
        if result.termination != TerminationCode::Ok {
            queue.push(node);
            break;
        }

        if node.bound >= cutoff(&result, settings) {
            continue;
        }

        let relax = solve(&node.lx, &node.ux, node.warm.as_deref(), callbacks)?;
        result.nodes += 1;
        if node.depth == 0 {
            result.root_status = Some(relax.status);
        }

        match relax.status {
            RelaxationStatus::Optimal => {}
            RelaxationStatus::Infeasible => continue,
            RelaxationStatus::Failed => {
                log::debug!("branch-and-bound: node {} dropped after a failed relaxation", node.id);
                incomplete = true;
                continue;
            }
            RelaxationStatus::Unbounded => {
                unbounded = true;
                break;
            }
            RelaxationStatus::Stopped(code) => {
                result.termination = code;
                queue.push(node);
                break;
            }
        }

        if relax.obj >= cutoff(&result, settings) {
            continue;
        }

        match most_fractional(&relax.x, integer, settings.tol_int, settings.seed) {
            None => {
                let improves = result
                    .incumbent
                    .as_ref()
                    .map_or(true, |(_, obj)| relax.obj < *obj);
                if improves {
                    log::debug!(
                        "branch-and-bound: new incumbent {:e} at node {}",
                        relax.obj,
                        node.id
                    );
                    result.num_int_solutions += 1;
                    result.incumbent = Some((round_integers(relax.x, integer), relax.obj));
                    let mut p = Progress::new(CallbackCode::NewIntSolution);
                    p.primal_obj = relax.obj;
                    p.mio_num_nodes = result.nodes as u32;
                    callbacks.notify(p);
                }
            }
            Some(j) => {
                let v = relax.x[j];
                let mut down = Node {
                    lx: node.lx.clone(),
                    ux: node.ux.clone(),
                    bound: relax.obj,
                    depth: node.depth + 1,
                    id: 0,
                    warm: relax.basis.clone(),
                };
                down.ux[j] = v.floor();
                let mut up = Node {
                    lx: node.lx,
                    ux: node.ux,
                    bound: relax.obj,
                    depth: node.depth + 1,
                    id: 0,
                    warm: relax.basis,
                };
                up.lx[j] = v.ceil();

                // the child nearer to the relaxation value goes first
                let up_first = (v - v.floor() >= 0.5) != (settings.seed % 2 == 1);
                let (first, second) = if up_first { (up, down) } else { (down, up) };
                let order: [Node; 2] = match settings.node_order {
                    // LIFO: push the preferred child last
                    NodeOrder::DepthFirst => [second, first],
                    NodeOrder::BestBound => [first, second],
                };
                for mut child in order {
                    child.id = next_id;
                    next_id += 1;
                    queue.push(child);
                }
            }
        }

        let mut p = Progress::new(CallbackCode::UpdateMio);
        p.mio_num_nodes = result.nodes as u32;
        p.mio_obj_bound = queue.min_bound().min(relax.obj);
        p.primal_obj = result.incumbent.as_ref().map_or(f64::NAN, |(_, obj)| *obj);
        callbacks.notify(p);
    }

    let exhausted = queue.is_empty() && result.termination == TerminationCode::Ok;
    result.bound = match (&result.incumbent, exhausted) {
        (Some((_, obj)), true) if !incomplete => *obj,
        (Some((_, obj)), _) => queue.min_bound().min(*obj),
        (None, _) => queue.min_bound(),
    };

    result.status = if unbounded {
        MipStatus::Unbounded
    } else if result.incumbent.is_some() {
        if exhausted && !incomplete {
            MipStatus::Optimal
        } else {
            MipStatus::Feasible
        }
    } else if exhausted && !incomplete {
        MipStatus::Infeasible
    } else {
        MipStatus::Unknown
    };

    log::info!(
        "branch-and-bound finished: {:?} after {} nodes, bound {:e}",
        result.status,
        result.nodes,
        result.bound
    );
    Ok(result)
}

/// Objective value at or above which nodes cannot improve the incumbent
/// by more than the gap tolerances
fn cutoff(result: &MipResult, settings: &MipSettings) -> f64 {
    match &result.incumbent {
        Some((_, obj)) => {
            obj - settings
                .tol_abs_gap
                .max(settings.tol_rel_gap * obj.abs().max(1.0))
                .max(1e-9 * obj.abs().max(1.0))
        }
        None => f64::INFINITY,
    }
}

fn round_integers(mut x: Vec<f64>, integer: &[bool]) -> Vec<f64> {
    for (v, &int) in x.iter_mut().zip(integer) {
        if int {
            *v = v.round();
        }
    }
    x
}

#[allow(clippy::too_many_arguments)]
fn construct_incumbent<'cb, F, E>(
    integer: &[bool],
    lx: &[f64],
    ux: &[f64],
    init: &[f64],
    settings: &MipSettings,
    callbacks: &mut SolverCallbacks<'cb>,
    solve: &mut F,
    result: &mut MipResult,
) -> Result<(), E>
where
    F: FnMut(&[f64], &[f64], Option<&[VarStatus]>, &mut SolverCallbacks<'cb>) -> Result<Relaxation, E>,
{
    let (mut l, mut u) = (lx.to_vec(), ux.to_vec());
    for j in 0..integer.len() {
        if !integer[j] {
            continue;
        }
        let v = init[j].round();
        if !v.is_finite() || v < lx[j] - settings.tol_int || v > ux[j] + settings.tol_int {
            log::debug!("initial value of variable {} is outside its bounds", j);
            return Ok(());
        }
        l[j] = v;
        u[j] = v;
    }

    let relax = solve(&l, &u, None, callbacks)?;
    if relax.status == RelaxationStatus::Optimal {
        log::debug!("constructed an initial incumbent with objective {:e}", relax.obj);
        result.construct_obj = Some(relax.obj);
        result.num_int_solutions += 1;
        result.incumbent = Some((round_integers(relax.x, integer), relax.obj));
    }
    Ok(())
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
