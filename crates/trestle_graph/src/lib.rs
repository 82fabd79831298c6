// trestle_graph: DAG adjacency bookkeeping
//
// Provides:
// - Immutable forward/reverse adjacency snapshot built from a root node
// - Mutable per-execution dependency tracking

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dag;

pub use dag::*;
