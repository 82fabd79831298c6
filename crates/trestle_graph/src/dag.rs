//! Dependency bookkeeping for one DAG.
//!
//! `DagInfo` is the immutable adjacency snapshot taken once from a root node;
//! `DagRun` is the mutable copy a single execution burns down as nodes
//! complete or fail.

use std::collections::{HashMap, HashSet};
use trestle_core::Work;

/// Immutable forward and reverse adjacency for a DAG.
#[derive(Clone, Debug)]
pub struct DagInfo<D: Work> {
    /// Node -> its forward dependencies.
    remaining_deps: HashMap<D, HashSet<D>>,

    /// Node -> the nodes that depend on it.
    reverse_deps: HashMap<D, HashSet<D>>,
}

impl<D: Work> DagInfo<D> {
    /// Traverse the graph once from `root`, recording each node's forward
    /// dependency set and inverting the edges into dependent sets.
    ///
    /// Nodes reachable along several paths are visited once. The traversal
    /// does not detect cycles; callers promise acyclicity.
    pub fn from_root(root: &D) -> Self {
        let mut remaining_deps: HashMap<D, HashSet<D>> = HashMap::new();
        let mut reverse_deps: HashMap<D, HashSet<D>> = HashMap::new();

        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            if remaining_deps.contains_key(&node) {
                continue;
            }

            let deps = node.dependencies();
            for dep in &deps {
                reverse_deps
                    .entry(dep.clone())
                    .or_default()
                    .insert(node.clone());
                if !remaining_deps.contains_key(dep) {
                    stack.push(dep.clone());
                }
            }
            reverse_deps.entry(node.clone()).or_default();
            remaining_deps.insert(node, deps.into_iter().collect());
        }

        Self {
            remaining_deps,
            reverse_deps,
        }
    }

    /// All nodes reachable from the root, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &D> {
        self.remaining_deps.keys()
    }

    /// The nodes that depend on `work`.
    pub fn dependents(&self, work: &D) -> Option<&HashSet<D>> {
        self.reverse_deps.get(work)
    }

    /// Number of reachable nodes.
    pub fn len(&self) -> usize {
        self.remaining_deps.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.remaining_deps.is_empty()
    }

    /// Clone the adjacency into the mutable bookkeeping for one execution.
    pub fn start(&self) -> DagRun<D> {
        DagRun {
            remaining: self.remaining_deps.clone(),
            reverse: self.reverse_deps.clone(),
        }
    }
}

/// Mutable per-execution dependency state.
///
/// A node is ready once its remaining set is empty; handing it out removes
/// its key, so a node is never handed out twice. A node's reverse entry is
/// popped when it finishes or is invalidated; the run is settled once every
/// reverse entry has been popped.
#[derive(Clone, Debug)]
pub struct DagRun<D: Work> {
    remaining: HashMap<D, HashSet<D>>,
    reverse: HashMap<D, HashSet<D>>,
}

impl<D: Work> DagRun<D> {
    /// Drain the nodes whose remaining dependency set is empty.
    pub fn take_ready(&mut self) -> Vec<D> {
        let ready: Vec<D> = self
            .remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(node, _)| node.clone())
            .collect();
        for node in &ready {
            self.remaining.remove(node);
        }
        ready
    }

    /// Record a successful completion, returning dependents that became
    /// ready.
    pub fn finish(&mut self, work: &D) -> Vec<D> {
        let mut ready = Vec::new();
        if let Some(dependents) = self.reverse.remove(work) {
            for dependent in dependents {
                // An invalidated dependent has no remaining entry.
                if let Some(deps) = self.remaining.get_mut(&dependent) {
                    deps.remove(work);
                    if deps.is_empty() {
                        self.remaining.remove(&dependent);
                        ready.push(dependent);
                    }
                }
            }
        }
        ready
    }

    /// Drop `work` and its transitive dependents from the run.
    ///
    /// Dropped nodes never become ready and are not reported as failures.
    pub fn invalidate(&mut self, work: &D) {
        let mut stack = vec![work.clone()];
        while let Some(node) = stack.pop() {
            self.remaining.remove(&node);
            if let Some(dependents) = self.reverse.remove(&node) {
                stack.extend(dependents);
            }
        }
    }

    /// Whether any node is still blocked on outstanding dependencies.
    pub fn blocked(&self) -> bool {
        !self.remaining.is_empty()
    }

    /// Whether every node has finished or been invalidated.
    pub fn settled(&self) -> bool {
        self.reverse.is_empty()
    }
}
