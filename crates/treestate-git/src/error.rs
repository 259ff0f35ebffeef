//! Error types for treestate-git

/// Result type for treestate-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the git binary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Git ran but exited non-zero; carries the trimmed stderr and exit code
    #[error("git command failed: {message}")]
    CommandFailed {
        message: String,
        exit_code: Option<i32>,
    },

    /// The git process could not be spawned at all
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// Git produced output this driver could not parse
    #[error("unparsable git output: {message}")]
    Parse { message: String },
}
