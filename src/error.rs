//! Error types for command execution.
//!
//! Command failures never escape the dispatcher: a trigger returning
//! `Err(CommandError)` is turned into a private `Error: ...` notice for the
//! caller. Configuration errors live in [`crate::config`].

use thiserror::Error;

/// Errors a command trigger may report back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Missing parameters. Carries the usage line shown to the caller.
    #[error("Too few parameters. Syntax: {0}")]
    NeedMoreParams(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0} not found.")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl CommandError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams(_) => "need_more_params",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The notice text sent to the caller.
    pub fn to_reply(&self) -> String {
        format!("Error: {}", self)
    }
}

/// Result type for command triggers.
pub type CommandResult = Result<(), CommandError>;
