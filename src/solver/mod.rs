//! Solver layer: the backtracking search engine, its parallel variant and
//! the result ranker.

pub mod engine;
pub mod parallel;
pub mod rank;

pub use engine::{BuildFinder, Gating, SearchProgress};
pub use rank::rank_builds;
