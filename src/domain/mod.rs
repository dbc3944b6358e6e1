//! Domain layer: catalog entities, orbment tree, canonical ordering
//!
//! This layer is independent of external concerns (no I/O beyond
//! `Catalog::load`, no CLI, no config loading).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod ordering;
pub mod tree;

pub use catalog::Catalog;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use ordering::{CanonicalOrdering, OrderingPolicy};
pub use tree::{OrbmentTree, SlotNode};
