//! Driver trait for git operations

use std::path::Path;

use async_trait::async_trait;

use crate::Result;
use crate::log::RawLog;
use crate::porcelain::RawStatus;

/// Options for log queries.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Limit the number of commits returned (`--max-count`)
    pub max_count: Option<usize>,
}

impl LogOptions {
    /// Only the most recent commit, enough to answer "is there any history?"
    pub fn head_only() -> Self {
        Self { max_count: Some(1) }
    }
}

/// Trait for asynchronous git subcommand execution.
///
/// Implementations are stateless: every call receives the repository root
/// explicitly, so a single driver instance can serve any number of
/// repositories. All methods surface git failures as typed errors; none of
/// them panic.
#[async_trait]
pub trait GitDriver: Send + Sync {
    /// Whether `root` is inside a git working tree.
    ///
    /// A directory that exists but is not a repository yields `Ok(false)`,
    /// not an error.
    async fn check_is_repo(&self, root: &Path) -> Result<bool>;

    /// Initialize a new repository at `root` (`git init`).
    async fn init(&self, root: &Path) -> Result<()>;

    /// Full working-tree status, untracked files included, ignored files
    /// excluded. The driver owns porcelain parsing; callers get the
    /// structured [`RawStatus`].
    async fn status(&self, root: &Path) -> Result<RawStatus>;

    /// Stage the given pathspecs (`git add -- <pathspecs>`).
    async fn add(&self, root: &Path, pathspecs: &[String]) -> Result<()>;

    /// Run `git reset` with the given trailing arguments.
    ///
    /// An empty `args` slice runs the bare no-ref form, which is the only
    /// reset that works on a repository whose HEAD is unborn.
    async fn reset(&self, root: &Path, args: &[String]) -> Result<()>;

    /// Record a commit with the given message.
    async fn commit(&self, root: &Path, message: &str) -> Result<()>;

    /// Run `git checkout` with the given trailing arguments.
    async fn checkout(&self, root: &Path, args: &[String]) -> Result<()>;

    /// Commit history, most recent first.
    ///
    /// A repository with no commits yields an empty log, not an error.
    async fn log(&self, root: &Path, options: &LogOptions) -> Result<RawLog>;
}
