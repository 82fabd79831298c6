//! Ready-set ordering strategies.
//!
//! `OrderedStrategy` keeps ready nodes in a sorted set and hands out the
//! highest-cost nodes first; `max_path` derives the cost metric from the
//! graph topology so the critical path drains earliest.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hasher;
use trestle_core::{ScheduleStrategy, Work};
use trestle_graph::DagInfo;

/// Total-order key for the ready set.
///
/// Cost orders first. The node's stable hash separates distinct equal-cost
/// nodes; the insertion sequence keeps the order total even when hashes
/// collide, so distinct nodes are never collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ReadyKey {
    cost: u64,
    hash: u64,
    seq: u64,
}

/// Ready set ordered by a cost metric, highest cost handed out first.
pub struct OrderedStrategy<D: Work> {
    ready: BTreeMap<ReadyKey, D>,
    cost: Box<dyn Fn(&D) -> u64>,
    seq: u64,
}

impl<D: Work> OrderedStrategy<D> {
    /// Strategy ordered by the given cost function.
    pub fn with_cost(cost: impl Fn(&D) -> u64 + 'static) -> Self {
        Self {
            ready: BTreeMap::new(),
            cost: Box::new(cost),
            seq: 0,
        }
    }

    /// Arrival-ordered strategy: every node costs the same.
    pub fn uniform() -> Self {
        Self::with_cost(|_| 0)
    }

    fn key(&mut self, work: &D) -> ReadyKey {
        let mut hasher = DefaultHasher::new();
        work.hash(&mut hasher);
        let key = ReadyKey {
            cost: (self.cost)(work),
            hash: hasher.finish(),
            seq: self.seq,
        };
        self.seq += 1;
        key
    }
}

impl<D: Work> ScheduleStrategy<D> for OrderedStrategy<D> {
    fn work_ready(&mut self, work: D) {
        let key = self.key(&work);
        self.ready.insert(key, work);
    }

    fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    fn next(&mut self, max: usize) -> Vec<D> {
        let mut out = Vec::with_capacity(max.min(self.ready.len()));
        while out.len() < max {
            match self.ready.pop_last() {
                Some((_, work)) => out.push(work),
                None => break,
            }
        }
        out
    }
}

/// Longest-path prioritization over `info`.
///
/// A node's cost is one unit plus the highest cost among the nodes that
/// depend on it, so nodes heading long dependent chains are handed out
/// first and the critical path drains earliest.
pub fn max_path<D: Work>(info: &DagInfo<D>) -> OrderedStrategy<D> {
    max_path_with(info, 1)
}

/// `max_path` with an explicit per-node cost unit.
pub fn max_path_with<D: Work>(info: &DagInfo<D>, self_cost: u64) -> OrderedStrategy<D> {
    let mut costs: HashMap<D, u64> = HashMap::with_capacity(info.len());
    for node in info.nodes() {
        path_cost(node, info, self_cost, &mut costs);
    }
    OrderedStrategy::with_cost(move |work| costs.get(work).copied().unwrap_or(self_cost))
}

fn path_cost<D: Work>(
    node: &D,
    info: &DagInfo<D>,
    self_cost: u64,
    memo: &mut HashMap<D, u64>,
) -> u64 {
    if let Some(&cost) = memo.get(node) {
        return cost;
    }
    let downstream = info
        .dependents(node)
        .map(|dependents| {
            dependents
                .iter()
                .map(|dependent| path_cost(dependent, info, self_cost, memo))
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0);
    let cost = self_cost + downstream;
    memo.insert(node.clone(), cost);
    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{graph, ids, sorted_ids, Task};

    #[test]
    fn test_highest_cost_first() {
        let task = graph(&[("a", &[]), ("bb", &[]), ("ccc", &[])]);
        let mut strategy = OrderedStrategy::with_cost(|work: &Task| work.id().len() as u64);
        strategy.work_ready(task("a"));
        strategy.work_ready(task("ccc"));
        strategy.work_ready(task("bb"));

        assert_eq!(ids(&strategy.next(2)), ["ccc", "bb"]);
        assert_eq!(ids(&strategy.next(2)), ["a"]);
        assert!(!strategy.has_ready());
    }

    #[test]
    fn test_equal_cost_nodes_are_not_collapsed() {
        let task = graph(&[("a", &[]), ("b", &[]), ("c", &[])]);
        let mut strategy = OrderedStrategy::uniform();
        strategy.work_ready(task("a"));
        strategy.work_ready(task("b"));
        strategy.work_ready(task("c"));

        assert_eq!(sorted_ids(&strategy.next(10)), ["a", "b", "c"]);
    }

    #[test]
    fn test_next_respects_max() {
        let task = graph(&[("a", &[]), ("b", &[]), ("c", &[]), ("d", &[])]);
        let mut strategy = OrderedStrategy::uniform();
        for id in ["a", "b", "c", "d"] {
            strategy.work_ready(task(id));
        }

        assert_eq!(strategy.next(3).len(), 3);
        assert!(strategy.has_ready());
        assert_eq!(strategy.next(3).len(), 1);
    }

    #[test]
    fn test_max_path_orders_by_dependent_chain_length() {
        // b heads a three-node dependent chain, c a one-node chain.
        let task = graph(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
            ("b2", &["b"]),
            ("b3", &["b2"]),
            ("root", &["d", "b3"]),
        ]);
        let info = trestle_graph::DagInfo::from_root(&task("root"));
        let mut strategy = max_path(&info);

        strategy.work_ready(task("b"));
        strategy.work_ready(task("c"));
        assert_eq!(ids(&strategy.next(1)), ["b"]);
        assert_eq!(ids(&strategy.next(1)), ["c"]);
    }

    #[test]
    fn test_max_path_cost_scales_with_self_cost() {
        let task = graph(&[("a", &[]), ("b", &["a"])]);
        let info = trestle_graph::DagInfo::from_root(&task("b"));

        // Same ordering whatever the unit; the leaf still comes first.
        let mut strategy = max_path_with(&info, 5);
        strategy.work_ready(task("a"));
        strategy.work_ready(task("b"));
        assert_eq!(ids(&strategy.next(2)), ["a", "b"]);
    }
}
