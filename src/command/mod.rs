mod commands;
mod history;
pub mod session_ops;
mod transaction;

use thiserror::Error;

pub use commands::{Command, CommandFuture, Delegate};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryManager};
pub use transaction::Transaction;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while applying or reverting a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The forward side effect of a command failed
    #[error("applying '{command}' failed: {reason}")]
    ApplyFailed { command: String, reason: String },

    /// The reverse side effect of a command failed
    #[error("reverting '{command}' failed: {reason}")]
    RevertFailed { command: String, reason: String },

    /// A delegate reported a failure from the diagram model service
    #[error("model service error: {0}")]
    Service(String),
}

impl CommandError {
    pub fn service(reason: impl Into<String>) -> Self {
        CommandError::Service(reason.into())
    }
}
