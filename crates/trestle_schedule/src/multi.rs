//! Composition of several sub-schedulers over one element type.

use std::collections::{BTreeMap, HashMap};
use trestle_core::{Schedule, Work, WorkFailure};

type SubId = u64;

/// Outcome of a sub-run that has drained.
pub struct SubOutcome<T> {
    /// Whether the sub-run recorded any direct failure.
    pub failed: bool,

    /// Caller-supplied tag attached when the sub-run was pushed.
    pub tag: Option<T>,
}

struct SubRun<D: Work, T> {
    schedule: Box<dyn Schedule<D>>,
    tag: Option<T>,
}

/// Routes `next` and `complete` across a set of live sub-schedulers.
///
/// Each node handed out is recorded against its owning sub-run so that the
/// completion is routed back correctly. A sub-run that drains is removed and
/// its failures are absorbed into the combined list.
pub struct MultiScheduler<D: Work, T> {
    subs: BTreeMap<SubId, SubRun<D, T>>,
    owners: HashMap<D, SubId>,
    failures: Vec<WorkFailure<D>>,
    next_id: SubId,
}

impl<D: Work, T> MultiScheduler<D, T> {
    /// Empty composition.
    pub fn new() -> Self {
        Self {
            subs: BTreeMap::new(),
            owners: HashMap::new(),
            failures: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a sub-scheduler with an optional tag.
    pub fn push(&mut self, schedule: Box<dyn Schedule<D>>, tag: Option<T>) {
        let id = self.next_id;
        self.next_id += 1;
        self.subs.insert(id, SubRun { schedule, tag });
    }

    /// Route a completion to the owning sub-run.
    ///
    /// If that sub-run has now drained it is removed, its failures are
    /// absorbed, and its outcome is returned.
    pub fn complete_owned(&mut self, work: &D, result: Option<String>) -> Option<SubOutcome<T>> {
        let id = self.owners.remove(work)?;
        let sub = self.subs.get_mut(&id)?;
        sub.schedule.complete(work, result);
        if sub.schedule.is_complete() {
            return self.remove(id);
        }
        None
    }

    /// Remove-and-report sub-runs that are drained without a completion
    /// call. A pushed scheduler may be complete from the start.
    pub fn reap(&mut self) -> Vec<SubOutcome<T>> {
        let drained: Vec<SubId> = self
            .subs
            .iter()
            .filter(|(_, sub)| sub.schedule.is_complete())
            .map(|(id, _)| *id)
            .collect();
        drained
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }

    /// Whether any live sub-run still carries a tag.
    pub fn tagged(&self) -> bool {
        self.subs.values().any(|sub| sub.tag.is_some())
    }

    fn remove(&mut self, id: SubId) -> Option<SubOutcome<T>> {
        let mut sub = self.subs.remove(&id)?;
        let failures = sub.schedule.take_failures();
        let failed = !failures.is_empty();
        self.failures.extend(failures);
        Some(SubOutcome {
            failed,
            tag: sub.tag.take(),
        })
    }
}

impl<D: Work, T> Default for MultiScheduler<D, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Work, T> Schedule<D> for MultiScheduler<D, T> {
    /// Round-robins the live sub-runs, taking one node per sub-run per lap
    /// until `max` is reached or nothing more is ready.
    fn next(&mut self, max: usize) -> Vec<D> {
        let mut out = Vec::new();
        loop {
            let mut progressed = false;
            for (&id, sub) in self.subs.iter_mut() {
                if out.len() == max {
                    return out;
                }
                if let Some(work) = sub.schedule.next(1).pop() {
                    self.owners.insert(work.clone(), id);
                    out.push(work);
                    progressed = true;
                }
            }
            if !progressed {
                return out;
            }
        }
    }

    fn complete(&mut self, work: &D, result: Option<String>) {
        self.complete_owned(work, result);
    }

    fn has_pending(&self) -> bool {
        self.subs.values().any(|sub| sub.schedule.has_pending())
    }

    fn is_complete(&self) -> bool {
        self.subs.values().all(|sub| sub.schedule.is_complete())
    }

    fn take_failures(&mut self) -> Vec<WorkFailure<D>> {
        self.reap();
        let mut failures = std::mem::take(&mut self.failures);
        for sub in self.subs.values_mut() {
            failures.extend(sub.schedule.take_failures());
        }
        failures
    }
}
