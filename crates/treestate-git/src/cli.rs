//! Git CLI driver implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::driver::{GitDriver, LogOptions};
use crate::log::{self, RawLog};
use crate::porcelain::{self, RawStatus};
use crate::{Error, Result};

/// [`GitDriver`] implementation that shells out to the `git` binary.
///
/// Every call spawns one subprocess with the repository root as its working
/// directory. The process-level index/worktree locks are git's own; callers
/// that issue mutating commands concurrently against one repository are
/// expected to serialize them.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Driver using `git` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }

    /// Driver using an explicit git binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a git command and return its raw stdout.
    async fn run(&self, root: &Path, args: &[&str]) -> Result<String> {
        tracing::debug!(root = %root.display(), ?args, "running git");

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(root)
            .output()
            .await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::CommandFailed {
                message: stderr.trim().to_string(),
                exit_code: output.status.code(),
            })
        }
    }
}

#[async_trait]
impl GitDriver for GitCli {
    async fn check_is_repo(&self, root: &Path) -> Result<bool> {
        if !root.is_dir() {
            return Ok(false);
        }
        match self.run(root, &["rev-parse", "--is-inside-work-tree"]).await {
            Ok(out) => Ok(out.trim() == "true"),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn init(&self, root: &Path) -> Result<()> {
        self.run(root, &["init"]).await.map(drop)
    }

    async fn status(&self, root: &Path) -> Result<RawStatus> {
        let out = self
            .run(
                root,
                &[
                    "status",
                    "--porcelain=v1",
                    "--branch",
                    "--untracked-files=all",
                    "-z",
                ],
            )
            .await?;
        porcelain::parse_porcelain(&out)
    }

    async fn add(&self, root: &Path, pathspecs: &[String]) -> Result<()> {
        // "--" keeps pathspecs from being read as flags.
        let mut args = vec!["add", "--"];
        args.extend(pathspecs.iter().map(String::as_str));
        self.run(root, &args).await.map(drop)
    }

    async fn reset(&self, root: &Path, extra: &[String]) -> Result<()> {
        let mut args = vec!["reset"];
        args.extend(extra.iter().map(String::as_str));
        self.run(root, &args).await.map(drop)
    }

    async fn commit(&self, root: &Path, message: &str) -> Result<()> {
        self.run(root, &["commit", "-m", message]).await.map(drop)
    }

    async fn checkout(&self, root: &Path, extra: &[String]) -> Result<()> {
        let mut args = vec!["checkout"];
        args.extend(extra.iter().map(String::as_str));
        self.run(root, &args).await.map(drop)
    }

    async fn log(&self, root: &Path, options: &LogOptions) -> Result<RawLog> {
        let format = log::format_arg();
        let max = options.max_count.map(|n| format!("--max-count={n}"));
        let mut args = vec!["log", format.as_str()];
        if let Some(max) = &max {
            args.push(max);
        }

        match self.run(root, &args).await {
            Ok(out) => log::parse_log(&out),
            // An unborn HEAD has no log; report it as empty rather than as
            // a failure so history checks work on fresh repositories.
            Err(Error::CommandFailed { message, .. })
                if message.contains("does not have any commits yet")
                    || message.contains("bad default revision") =>
            {
                Ok(RawLog::default())
            }
            Err(e) => Err(e),
        }
    }
}
