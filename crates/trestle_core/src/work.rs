//! Work items and the compound-work capability.

use crate::schedule::Schedule;
use std::hash::Hash;

/// A schedulable unit of work.
///
/// Implementors are cheap-to-clone owned handles with value identity: two
/// clones of the same logical node compare equal and hash identically. The
/// engine traverses `dependencies` once per run, so the returned set must be
/// pure and stable for the duration of a run.
pub trait Work: Clone + Eq + Hash + 'static {
    /// The nodes this node depends on.
    fn dependencies(&self) -> Vec<Self>;

    /// Compound-work opt-in.
    ///
    /// A node returning `Some` is not handed to a worker when it becomes
    /// ready. The compound scheduler installs the returned sub-scheduler in
    /// its place and schedules `do_finally` once that sub-scheduler has
    /// drained, with or without failures.
    fn sub_work(&self) -> Option<SubWork<Self>> {
        None
    }
}

/// Substitutive work for a compound node.
pub struct SubWork<D: Work> {
    /// Scheduler for the node's sub-graph.
    pub scheduler: Box<dyn Schedule<D>>,

    /// Scheduler run after `scheduler` drains, even if it drained with
    /// failures.
    pub do_finally: Box<dyn Schedule<D>>,
}

impl<D: Work> SubWork<D> {
    /// Pair a sub-graph scheduler with its finally scheduler.
    pub fn new(scheduler: Box<dyn Schedule<D>>, do_finally: Box<dyn Schedule<D>>) -> Self {
        Self {
            scheduler,
            do_finally,
        }
    }
}
