//! Engine entry point.

use crate::distributor::{Distributor, RunError};
use std::panic::{self, AssertUnwindSafe};
use tracing::Span;
use trestle_core::{Work, WorkFailure};
use trestle_graph::DagInfo;
use trestle_schedule::{max_path, CompoundScheduler, DagScheduler};

/// Execute every node reachable from `root`, with at most `maximum_tasks`
/// actions in flight at once.
///
/// `action` returns `None` on success or `Some(message)` on failure; panics
/// inside it are trapped and reported as failures. Failure messages are
/// wrapped as `"Error running {name}: {message}"`. Dependents of a failed
/// node are invalidated without producing a record of their own; compound
/// nodes expand into their sub-graph and always get their finally graph
/// scheduled.
///
/// Each action runs inside the span `log` produces for its node. Returns
/// once all reachable work has completed, failed or been invalidated.
pub fn run<D, N, A, L>(
    root: &D,
    name: N,
    action: A,
    maximum_tasks: usize,
    log: L,
) -> Result<Vec<WorkFailure<D>>, RunError>
where
    D: Work + Send,
    N: Fn(&D) -> String + Sync,
    A: Fn(&D) -> Option<String> + Sync,
    L: Fn(&D) -> Span + Sync,
{
    let info = DagInfo::from_root(root);
    let scheduler = DagScheduler::new(&info, max_path(&info));
    let schedule = CompoundScheduler::new(Box::new(scheduler));
    let work_fn = move |work: &D| {
        trap(|| action(work)).map(|message| format!("Error running {}: {}", name(work), message))
    };
    Distributor::new(schedule, work_fn, log, maximum_tasks)?.run()
}

/// [`run`] with a standard per-node debug span.
pub fn run_with_default_log<D, N, A>(
    root: &D,
    name: N,
    action: A,
    maximum_tasks: usize,
) -> Result<Vec<WorkFailure<D>>, RunError>
where
    D: Work + Send,
    N: Fn(&D) -> String + Sync,
    A: Fn(&D) -> Option<String> + Sync,
{
    let log = |work: &D| tracing::debug_span!("work", node = %name(work));
    run(root, &name, action, maximum_tasks, log)
}

/// Run `f`, converting a panic into a failure message.
///
/// The panic is reported through the current span before being swallowed so
/// it is attributed to the node whose action raised it.
fn trap(f: impl FnOnce() -> Option<String>) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "action panicked");
            Some(message)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "action panicked".to_string()
    }
}
