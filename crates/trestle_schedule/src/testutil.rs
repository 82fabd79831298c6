//! Shared graph builders for scheduler tests.

use crate::dag::DagScheduler;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use trestle_core::{SubWork, Work};

pub struct Plan {
    deps: HashMap<&'static str, Vec<&'static str>>,
    compound: HashMap<&'static str, (Task, Task)>,
}

/// Test work item: identity is the id, edges live in the shared plan.
#[derive(Clone)]
pub struct Task {
    id: &'static str,
    plan: Arc<Plan>,
}

impl Task {
    pub fn id(&self) -> &'static str {
        self.id
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Work for Task {
    fn dependencies(&self) -> Vec<Self> {
        self.plan
            .deps
            .get(self.id)
            .map(|deps| {
                deps.iter()
                    .map(|id| Task {
                        id,
                        plan: self.plan.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sub_work(&self) -> Option<SubWork<Self>> {
        self.plan.compound.get(self.id).map(|(sub, finally)| {
            SubWork::new(
                Box::new(DagScheduler::from_root(sub)),
                Box::new(DagScheduler::from_root(finally)),
            )
        })
    }
}

/// Build a graph; `edges` maps each node to its dependencies. Returns a
/// constructor from id to node.
pub fn graph(edges: &[(&'static str, &[&'static str])]) -> impl Fn(&'static str) -> Task {
    plan_nodes(edges, &[])
}

/// `graph` plus compound nodes: each entry names a node and supplies the
/// roots of its substitutive sub-graph and its finally graph. Node ids must
/// be unique across the outer and inner graphs.
pub fn compound_graph(
    edges: &[(&'static str, &[&'static str])],
    compound: &[(&'static str, Task, Task)],
) -> impl Fn(&'static str) -> Task {
    plan_nodes(edges, compound)
}

fn plan_nodes(
    edges: &[(&'static str, &[&'static str])],
    compound: &[(&'static str, Task, Task)],
) -> impl Fn(&'static str) -> Task {
    let plan = Arc::new(Plan {
        deps: edges
            .iter()
            .map(|(id, deps)| (*id, deps.to_vec()))
            .collect(),
        compound: compound
            .iter()
            .map(|(id, sub, finally)| (*id, (sub.clone(), finally.clone())))
            .collect(),
    });
    move |id| Task {
        id,
        plan: plan.clone(),
    }
}

/// Ids of `tasks` in order.
pub fn ids(tasks: &[Task]) -> Vec<&'static str> {
    tasks.iter().map(|task| task.id).collect()
}

/// Ids of `tasks`, sorted.
pub fn sorted_ids(tasks: &[Task]) -> Vec<&'static str> {
    let mut out = ids(tasks);
    out.sort_unstable();
    out
}
