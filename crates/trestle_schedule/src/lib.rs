// trestle_schedule: scheduling policy and scheduler composition
//
// Provides:
// - Cost-ordered ready sets and longest-path prioritization
// - The per-DAG scheduler
// - Multi-scheduler composition and compound-work expansion

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compound;
pub mod dag;
pub mod multi;
pub mod strategy;

pub use compound::*;
pub use dag::*;
pub use multi::*;
pub use strategy::*;

#[cfg(test)]
mod testutil;
