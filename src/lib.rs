//! Orbment build solver for Trails in the Sky FC.
//!
//! Given a character's orbment topology, a pool of quartz and a set of
//! desired arts, the solver enumerates every distinct assignment of quartz
//! to slots that unlocks all desired arts, pruning symmetric permutations
//! and honoring element restrictions, family exclusivity and per-line
//! Blade/Shield limits. Results are ranked by total arts unlocked.
//!
//! Layering:
//! - [`domain`]: catalog entities, the arena orbment tree, canonical ordering
//! - [`solver`]: the backtracking engine, parallel variant, ranker
//! - [`application`]: saved sessions and the result cache
//! - [`cli`]: the command-line surface

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod solver;
pub mod util;

pub use domain::{Art, Build, Catalog, Character, OrbmentTree, Placement, Quartz};
pub use solver::{BuildFinder, Gating};
