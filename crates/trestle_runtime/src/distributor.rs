//! Worker pool and driving loop.
//!
//! The distributor owns a pool of up to `workers` OS threads and the
//! completion queue they publish into. The driving loop runs on the calling
//! thread and is the sole mutator of scheduler state: workers only execute
//! the work function and send back a completion record.

use crossbeam_channel::unbounded;
use std::thread;
use tracing::{debug, trace, Span};
use trestle_core::{Schedule, Work, WorkFailure};

/// Errors surfaced by the distributor.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// `maximum_tasks` must be at least one.
    #[error("maximum tasks must be at least 1")]
    NoWorkers,

    /// The scheduler violated its contract; the run is aborted.
    #[error("scheduler contract violated: {0}")]
    Scheduler(String),
}

/// Completion record published by a worker.
struct Done<D> {
    work: D,
    result: Option<String>,
}

/// Owns the worker pool and the completion queue, and drives a scheduler to
/// exhaustion with bounded parallelism.
///
/// The work function must not panic; [`crate::run`] installs the panic trap
/// around the caller's action before constructing a distributor.
pub struct Distributor<S, F, L> {
    schedule: S,
    work_fn: F,
    log: L,
    workers: usize,
}

impl<S, F, L> Distributor<S, F, L> {
    /// New distributor over `schedule` with a pool of `workers` threads.
    ///
    /// `work_fn` executes one node, returning `None` on success or the
    /// failure message; `log` produces the span each node runs inside.
    pub fn new(schedule: S, work_fn: F, log: L, workers: usize) -> Result<Self, RunError> {
        if workers == 0 {
            return Err(RunError::NoWorkers);
        }
        Ok(Self {
            schedule,
            work_fn,
            log,
            workers,
        })
    }

    /// Drive the scheduler to exhaustion and return the direct failures.
    ///
    /// Blocks until every reachable node has completed, failed or been
    /// invalidated. The loop waits for at least one completion per iteration
    /// before scheduling more, so the scheduler always observes newly
    /// unblocked work.
    pub fn run<D>(mut self) -> Result<Vec<WorkFailure<D>>, RunError>
    where
        D: Work + Send,
        S: Schedule<D>,
        F: Fn(&D) -> Option<String> + Sync,
        L: Fn(&D) -> Span + Sync,
    {
        let (sender, receiver) = unbounded::<Done<D>>();
        let work_fn = &self.work_fn;
        let log = &self.log;
        let schedule = &mut self.schedule;
        let workers = self.workers;

        thread::scope(|scope| {
            let mut running = 0usize;
            loop {
                if running < workers && schedule.has_pending() {
                    let available = workers - running;
                    let batch = schedule.next(available);
                    if batch.len() > available {
                        return Err(RunError::Scheduler(format!(
                            "{} nodes returned with {} workers available",
                            batch.len(),
                            available
                        )));
                    }
                    if batch.is_empty() && running == 0 {
                        return Err(RunError::Scheduler(
                            "no nodes returned while idle with work pending".to_string(),
                        ));
                    }
                    for work in batch {
                        running += 1;
                        trace!(running, "starting worker");
                        let sender = sender.clone();
                        scope.spawn(move || {
                            let span = log(&work);
                            let result = span.in_scope(|| work_fn(&work));
                            let _ = sender.send(Done { work, result });
                        });
                    }
                }

                if running == 0 && !schedule.has_pending() {
                    return Ok(());
                }

                let done = receiver
                    .recv()
                    .map_err(|_| RunError::Scheduler("completion queue closed".to_string()))?;
                running -= 1;
                if let Some(message) = &done.result {
                    debug!(%message, "node failed");
                }
                schedule.complete(&done.work, done.result);
            }
        })?;

        Ok(self.schedule.take_failures())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Span;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    struct Key(&'static str);

    impl Work for Key {
        fn dependencies(&self) -> Vec<Self> {
            Vec::new()
        }
    }

    /// Scheduler that misbehaves on demand.
    struct Rogue {
        yield_extra: bool,
        stall: bool,
        served: bool,
    }

    impl Schedule<Key> for Rogue {
        fn next(&mut self, max: usize) -> Vec<Key> {
            if self.stall {
                return Vec::new();
            }
            self.served = true;
            if self.yield_extra {
                (0..=max).map(|_| Key("n")).collect()
            } else {
                vec![Key("n")]
            }
        }

        fn complete(&mut self, _work: &Key, _result: Option<String>) {}

        fn has_pending(&self) -> bool {
            !self.served
        }

        fn is_complete(&self) -> bool {
            self.served
        }

        fn take_failures(&mut self) -> Vec<WorkFailure<Key>> {
            Vec::new()
        }
    }

    fn no_log(_: &Key) -> Span {
        Span::none()
    }

    #[test]
    fn test_rejects_zero_workers() {
        let rogue = Rogue {
            yield_extra: false,
            stall: false,
            served: false,
        };
        let result = Distributor::new(rogue, |_: &Key| -> Option<String> { None }, no_log, 0);
        assert!(matches!(result, Err(RunError::NoWorkers)));
    }

    #[test]
    fn test_aborts_when_scheduler_yields_too_many() {
        let rogue = Rogue {
            yield_extra: true,
            stall: false,
            served: false,
        };
        let distributor = Distributor::new(rogue, |_: &Key| -> Option<String> { None }, no_log, 2).unwrap();
        assert!(matches!(distributor.run(), Err(RunError::Scheduler(_))));
    }

    #[test]
    fn test_aborts_when_scheduler_stalls_while_idle() {
        let rogue = Rogue {
            yield_extra: false,
            stall: true,
            served: false,
        };
        let distributor = Distributor::new(rogue, |_: &Key| -> Option<String> { None }, no_log, 2).unwrap();
        assert!(matches!(distributor.run(), Err(RunError::Scheduler(_))));
    }
}
