//! Information items of the last solve.

use std::collections::HashMap;

/// Integer information items
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntInfItem {
    /// interior point iterations
    IntpntIter,
    /// simplex iterations, including crossover
    SimPrimalIter,
    /// branch-and-bound nodes solved
    MioNumNodes,
    /// 1 if a feasible solution was built from the initial integer values
    MioConstructSolution,
    /// improving integer solutions found
    MioNumIntSolutions,
    PresolveNumRemovedVars,
    PresolveNumRemovedCons,
}

/// Floating point information items.  Times are in seconds.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DouInfItem {
    OptimizerTime,
    IntpntTime,
    SimTime,
    PresolveTime,
    MioTime,
    /// best objective bound of the branch-and-bound tree
    MioObjBound,
    MioObjRelGap,
    MioObjAbsGap,
    /// objective of the solution built from the initial integer values
    MioConstructSolutionObj,
    /// weighted violation of the last primal repair
    PrimalRepairPenaltyObj,
}

/// Values of the information items.  Items that were not set by the
/// last solve read as 0, or NaN for objective related items.
#[derive(Debug, Clone, Default)]
pub(crate) struct InfoItems {
    ints: HashMap<IntInfItem, i64>,
    doubles: HashMap<DouInfItem, f64>,
}

impl InfoItems {
    pub fn clear(&mut self) {
        self.ints.clear();
        // the repair penalty outlives the solve that follows a repair
        self.doubles
            .retain(|k, _| *k == DouInfItem::PrimalRepairPenaltyObj);
    }

    pub fn set_int(&mut self, item: IntInfItem, value: i64) {
        self.ints.insert(item, value);
    }

    pub fn add_int(&mut self, item: IntInfItem, value: i64) {
        *self.ints.entry(item).or_insert(0) += value;
    }

    pub fn set_double(&mut self, item: DouInfItem, value: f64) {
        self.doubles.insert(item, value);
    }

    pub fn int(&self, item: IntInfItem) -> i64 {
        self.ints.get(&item).copied().unwrap_or(0)
    }

    pub fn double(&self, item: DouInfItem) -> f64 {
        match self.doubles.get(&item) {
            Some(&v) => v,
            None => match item {
                DouInfItem::MioObjBound
                | DouInfItem::MioObjRelGap
                | DouInfItem::MioObjAbsGap
                | DouInfItem::MioConstructSolutionObj
                | DouInfItem::PrimalRepairPenaltyObj => f64::NAN,
                _ => 0.0,
            },
        }
    }
}

#[test]
fn test_info_defaults() {
    let mut info = InfoItems::default();
    assert_eq!(info.int(IntInfItem::IntpntIter), 0);
    assert!(info.double(DouInfItem::MioObjBound).is_nan());
    info.add_int(IntInfItem::SimPrimalIter, 3);
    info.add_int(IntInfItem::SimPrimalIter, 4);
    assert_eq!(info.int(IntInfItem::SimPrimalIter), 7);
    info.set_double(DouInfItem::PrimalRepairPenaltyObj, 2.0);
    info.set_double(DouInfItem::SimTime, 1.0);
    info.clear();
    assert_eq!(info.double(DouInfItem::SimTime), 0.0);
    assert_eq!(info.double(DouInfItem::PrimalRepairPenaltyObj), 2.0);
}
