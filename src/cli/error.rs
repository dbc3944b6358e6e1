//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    App(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::App(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::App(e) => match e {
                ApplicationError::Domain(d) => match d {
                    DomainError::UnknownQuartz(_)
                    | DomainError::UnknownArt(_)
                    | DomainError::UnknownCharacter(_)
                    | DomainError::EmptyQuartzPool
                    | DomainError::EmptyDesiredArts => crate::exitcode::USAGE,
                    DomainError::DataFile { .. } => crate::exitcode::NOINPUT,
                    DomainError::InvalidData { .. } => crate::exitcode::DATAERR,
                },
                ApplicationError::SessionNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::InvalidSessionName(_) => crate::exitcode::USAGE,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Io { .. } => crate::exitcode::IOERR,
                ApplicationError::InvalidJson { .. } => crate::exitcode::DATAERR,
            },
        }
    }
}
