// trestle_core: Pure contracts only, no IO
//
// Core abstractions for the parallel execution engine:
// - Work item contract and compound-work capability
// - Scheduler and strategy contracts
// - Per-node failure records

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod failure;
pub mod schedule;
pub mod work;

pub use failure::*;
pub use schedule::*;
pub use work::*;
