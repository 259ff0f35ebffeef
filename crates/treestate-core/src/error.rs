//! Error types for treestate-core

use std::path::PathBuf;

/// Result type for treestate-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treestate-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation attempted before any successful `initialize`
    #[error("engine is not initialized")]
    NotInitialized,

    /// Operation attempted after `dispose`
    #[error("engine has been disposed")]
    Disposed,

    /// Target directory failed the repository check
    #[error("not a git repository: {path}")]
    NotARepository { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Git driver error from treestate-git
    #[error(transparent)]
    Git(#[from] treestate_git::Error),

    /// Watch error from treestate-watch
    #[error(transparent)]
    Watch(#[from] treestate_watch::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
