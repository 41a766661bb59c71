//! Errors surfaced by the command-line tools.

use std::path::PathBuf;

use thiserror::Error;

use td_core::error::{CommandError, ConfigError};

/// Anything that can stop a tool run.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation found problems.
    #[error("{count} problem(s) found in {files} file(s)")]
    Invalid {
        /// Number of problems.
        count: usize,
        /// Files checked.
        files: usize,
    },

    /// A scripted command was rejected by the world.
    #[error("command rejected: {0}")]
    Command(#[from] CommandError),

    /// A command-line argument could not be interpreted.
    #[error("invalid argument '{value}': {reason}")]
    Argument {
        /// The argument as given.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Summary could not be encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn argument(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Argument {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
