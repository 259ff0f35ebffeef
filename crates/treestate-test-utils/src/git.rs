//! Git repository fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs —
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE** — directory structure only, no git object store.
///
/// Use for: tests that need a `.git` marker to satisfy path detection logic but
/// do not perform any real git operations.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create refs/heads: {e}"));
    fs::write(path.join(".git/refs/heads/main"), "")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write refs/heads/main: {e}"));
}

/// Initialises a real git repository using `git2` (no initial commit, no config).
///
/// Realism level: **REAL** — valid git object store, empty history, unborn HEAD.
///
/// Use for: tests that exercise zero-commit behaviour (status on a fresh
/// repository, reset-form selection) or that only need a valid object store.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    let repo = git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    });
    configure_identity(path);
    repo
}

/// Initialises a real git repository with an initial commit using the `git` CLI.
///
/// Realism level: **REAL WITH HISTORY** — valid git state, `main` branch, one
/// commit in history.
///
/// Specifically:
/// - Runs `git init`
/// - Configures `user.email`, `user.name`, and `commit.gpgsign = false`
/// - Creates `README.md` and makes an initial commit
/// - Renames the default branch to `main`
///
/// Use for: tests that need real history (log queries, unstage against HEAD,
/// discard of tracked edits).
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    run_git(path, &["init"]);
    configure_identity(path);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-m", "Initial commit"]);
    // Best-effort: older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// TempDir-backed repository with an unborn HEAD (no commits).
pub fn temp_repo_empty() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("failed to create tempdir");
    real_git_repo(temp.path());
    temp
}

/// TempDir-backed repository with one commit on `main`.
pub fn temp_repo_with_commit() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("failed to create tempdir");
    real_git_repo_with_commit(temp.path());
    temp
}

fn configure_identity(path: &Path) {
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);
}

fn run_git(path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("fixture: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "fixture: `git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
