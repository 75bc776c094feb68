//! Console errors.

use firelayer::error::StoreError;
use thiserror::Error;

/// Errors raised while parsing or running a console line.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The line did not match the command's usage.
    #[error("usage: {0}")]
    Usage(String),

    /// The first word is not a known command.
    #[error("unknown command: {0} (try .help)")]
    UnknownCommand(String),

    /// The model name is not registered with the console.
    #[error("unknown model: {0} (try .models)")]
    UnknownModel(String),

    /// The store or model layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Seed data was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a script or seed file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
