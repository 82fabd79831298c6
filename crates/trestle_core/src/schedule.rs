//! Scheduler contracts.
//!
//! `ScheduleStrategy` is the pluggable pick-next policy; `Schedule` is the
//! runtime contract the distributor drives. Both are called from a single
//! thread only — the driving loop is the sole mutator of scheduler state.

use crate::failure::WorkFailure;

/// Policy for choosing which ready nodes run next.
pub trait ScheduleStrategy<D> {
    /// Declare a node ready to run.
    fn work_ready(&mut self, work: D);

    /// Whether any declared node is still waiting to be handed out.
    fn has_ready(&self) -> bool;

    /// Remove and return up to `max` nodes to run now.
    ///
    /// Selection is deterministic given the strategy's ordering; the order
    /// among the returned nodes is unspecified.
    fn next(&mut self, max: usize) -> Vec<D>;
}

/// Runtime scheduler contract.
pub trait Schedule<D> {
    /// Remove and return up to `max` runnable nodes.
    ///
    /// Must never return more than `max` nodes, and must return at least one
    /// node when nothing is in flight and `has_pending` holds.
    fn next(&mut self, max: usize) -> Vec<D>;

    /// Record the outcome of a node handed out by `next`.
    ///
    /// `None` is success. `Some` carries the failure message; the node's
    /// transitive dependents are invalidated and never handed out.
    fn complete(&mut self, work: &D, result: Option<String>);

    /// Whether work remains that has neither run nor been invalidated.
    fn has_pending(&self) -> bool;

    /// Whether every node has completed, failed or been invalidated.
    fn is_complete(&self) -> bool;

    /// Drain the accumulated direct failures.
    fn take_failures(&mut self) -> Vec<WorkFailure<D>>;
}
