//! Error types for hgsync

use thiserror::Error;

/// Result type alias for hgsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for hgsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The `hg` executable exited with a non-zero status.
    ///
    /// Displays the tool's own error text unchanged.
    #[error("{stderr}")]
    Command {
        /// The subcommand line that failed (e.g. `hg pull -r default`)
        command: String,
        /// Raw standard error of the failed invocation
        stderr: String,
    },

    /// The executable could not be started at all
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns the failing command line for subprocess failures
    pub fn command(&self) -> Option<&str> {
        match self {
            Error::Command { command, .. } => Some(command),
            _ => None,
        }
    }
}
