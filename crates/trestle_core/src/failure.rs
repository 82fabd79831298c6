//! Per-node failure records.

use std::fmt;

/// Terminal record for a node whose action failed.
///
/// Only directly-failed nodes produce a record. Dependents invalidated by the
/// failure are dropped from scheduling without one.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkFailure<D> {
    /// The node that failed.
    pub work: D,

    /// The failure message reported for the node.
    pub message: String,
}

impl<D> WorkFailure<D> {
    /// Create a failure record.
    pub fn new(work: D, message: impl Into<String>) -> Self {
        Self {
            work,
            message: message.into(),
        }
    }
}

impl<D> fmt::Display for WorkFailure<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
