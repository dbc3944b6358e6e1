//! Application layer: session persistence and the search result cache
//!
//! This layer orchestrates domain logic with on-disk state; the solver
//! itself never touches the filesystem.

pub mod cache;
pub mod error;
pub mod session;

pub use cache::{cache_key, ResultCache};
pub use error::{ApplicationError, ApplicationResult};
pub use session::{Session, SessionStore};
