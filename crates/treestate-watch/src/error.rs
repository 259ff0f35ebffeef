//! Error types for treestate-watch

use std::path::PathBuf;

/// Result type for treestate-watch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up filesystem watches
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native watcher could not bind to the root (missing directory,
    /// permissions, watch-descriptor exhaustion)
    #[error("failed to watch {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// An exclusion glob failed to compile
    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] ignore::Error),
}
