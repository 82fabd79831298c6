//! Sub-DAG expansion for compound work.
//!
//! A compound node is never handed to a worker directly. When the wrapped
//! scheduler yields one, it is replaced by its substitutive sub-scheduler;
//! once that sub-scheduler drains, the deferred finally scheduler is
//! installed and the compound node either runs (sub-graph succeeded) or is
//! failed with a generic message (sub-graph failed), propagating to its
//! dependents in the outer graph.

use crate::multi::{MultiScheduler, SubOutcome};
use crate::strategy::OrderedStrategy;
use tracing::debug;
use trestle_core::{Schedule, ScheduleStrategy, SubWork, Work, WorkFailure};

/// Failure message recorded for a compound node whose sub-graph failed.
pub const SUBTASKS_FAILED: &str = "One or more subtasks failed";

/// Remembers the compound node a sub-run substitutes for, and the finally
/// scheduler owed once it drains.
struct FinallyTag<D: Work> {
    node: D,
    do_finally: Box<dyn Schedule<D>>,
}

/// Scheduler layer that expands compound nodes into sub-schedulers.
pub struct CompoundScheduler<D: Work> {
    multi: MultiScheduler<D, FinallyTag<D>>,
    /// Compound nodes whose sub-graph succeeded; they are the only thing
    /// left to run for their expansion and go out ahead of new graph work.
    final_work: OrderedStrategy<D>,
}

impl<D: Work> CompoundScheduler<D> {
    /// Wrap `top` as the outer scheduler.
    pub fn new(top: Box<dyn Schedule<D>>) -> Self {
        let mut multi = MultiScheduler::new();
        multi.push(top, None);
        Self {
            multi,
            final_work: OrderedStrategy::uniform(),
        }
    }

    /// Install a compound node's substitutive sub-scheduler. The node stays
    /// in flight in its owning sub-run until the sub-graph settles.
    fn expand(&mut self, node: D, sub: SubWork<D>) {
        debug!("expanding compound work into sub-run");
        self.multi.push(
            sub.scheduler,
            Some(FinallyTag {
                node,
                do_finally: sub.do_finally,
            }),
        );
    }

    /// Process drained sub-runs until nothing more settles. A drained
    /// sub-run may complete its compound node, which can drain further
    /// sub-runs; a pushed scheduler may even be complete from the start.
    fn settle(&mut self) {
        loop {
            let drained = self.multi.reap();
            if drained.is_empty() {
                break;
            }
            for outcome in drained {
                self.sub_drained(outcome);
            }
        }
    }

    fn sub_drained(&mut self, outcome: SubOutcome<FinallyTag<D>>) {
        // Untagged sub-runs are finally phases: their failures were absorbed
        // and nothing further is owed.
        let Some(tag) = outcome.tag else { return };

        self.multi.push(tag.do_finally, None);
        if outcome.failed {
            debug!("compound sub-run failed, failing compound node");
            self.complete_routed(&tag.node, Some(SUBTASKS_FAILED.to_string()));
        } else {
            self.final_work.work_ready(tag.node);
        }
    }

    fn complete_routed(&mut self, work: &D, result: Option<String>) {
        if let Some(outcome) = self.multi.complete_owned(work, result) {
            self.sub_drained(outcome);
        }
    }
}

impl<D: Work> Schedule<D> for CompoundScheduler<D> {
    fn next(&mut self, max: usize) -> Vec<D> {
        let mut out = self.final_work.next(max);
        while out.len() < max {
            let batch = self.multi.next(max - out.len());
            if batch.is_empty() {
                break;
            }
            for work in batch {
                match work.sub_work() {
                    // Expansion consumes none of the budget.
                    Some(sub) => self.expand(work, sub),
                    None => out.push(work),
                }
            }
            self.settle();
            let room = max - out.len();
            out.extend(self.final_work.next(room));
        }
        out
    }

    fn complete(&mut self, work: &D, result: Option<String>) {
        self.complete_routed(work, result);
        self.settle();
    }

    fn has_pending(&self) -> bool {
        self.final_work.has_ready() || self.multi.has_pending() || self.multi.tagged()
    }

    fn is_complete(&self) -> bool {
        !self.final_work.has_ready() && self.multi.is_complete()
    }

    fn take_failures(&mut self) -> Vec<WorkFailure<D>> {
        self.multi.take_failures()
    }
}
