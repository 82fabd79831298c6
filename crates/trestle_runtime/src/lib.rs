// trestle_runtime: worker pool, completion queue, driving loop
//
// Provides:
// - Distributor owning the worker pool and the completion queue
// - Panic trapping around worker actions
// - The blocking `run` entry point

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distributor;
pub mod run;

pub use distributor::*;
pub use run::*;
