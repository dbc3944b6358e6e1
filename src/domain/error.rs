//! Domain-level errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unknown quartz: {0}")]
    UnknownQuartz(String),

    #[error("unknown art: {0}")]
    UnknownArt(String),

    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    #[error("quartz pool is empty")]
    EmptyQuartzPool,

    #[error("no desired arts selected")]
    EmptyDesiredArts,

    #[error("failed to read data file: {path}")]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data file {path}: {reason}")]
    InvalidData { path: PathBuf, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
