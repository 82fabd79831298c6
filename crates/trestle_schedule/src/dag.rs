//! Per-DAG scheduler.

use crate::strategy::{max_path, OrderedStrategy};
use trestle_core::{Schedule, ScheduleStrategy, Work, WorkFailure};
use trestle_graph::{DagInfo, DagRun};

/// Binds one DAG's dependency bookkeeping to a scheduling strategy.
pub struct DagScheduler<D: Work, S = OrderedStrategy<D>> {
    run: DagRun<D>,
    strategy: S,
    failures: Vec<WorkFailure<D>>,
}

impl<D: Work> DagScheduler<D> {
    /// Scheduler over the graph rooted at `root`, with longest-path
    /// prioritization.
    pub fn from_root(root: &D) -> Self {
        let info = DagInfo::from_root(root);
        let strategy = max_path(&info);
        Self::new(&info, strategy)
    }
}

impl<D: Work, S: ScheduleStrategy<D>> DagScheduler<D, S> {
    /// Scheduler over `info` using `strategy`, seeded with the nodes that
    /// have no prerequisites.
    pub fn new(info: &DagInfo<D>, strategy: S) -> Self {
        let mut scheduler = Self {
            run: info.start(),
            strategy,
            failures: Vec::new(),
        };
        for work in scheduler.run.take_ready() {
            scheduler.strategy.work_ready(work);
        }
        scheduler
    }
}

impl<D: Work, S: ScheduleStrategy<D>> Schedule<D> for DagScheduler<D, S> {
    fn next(&mut self, max: usize) -> Vec<D> {
        self.strategy.next(max)
    }

    fn complete(&mut self, work: &D, result: Option<String>) {
        match result {
            None => {
                for ready in self.run.finish(work) {
                    self.strategy.work_ready(ready);
                }
            }
            Some(message) => {
                self.failures.push(WorkFailure::new(work.clone(), message));
                self.run.invalidate(work);
            }
        }
    }

    fn has_pending(&self) -> bool {
        self.strategy.has_ready() || self.run.blocked()
    }

    fn is_complete(&self) -> bool {
        !self.strategy.has_ready() && self.run.settled()
    }

    fn take_failures(&mut self) -> Vec<WorkFailure<D>> {
        std::mem::take(&mut self.failures)
    }
}
