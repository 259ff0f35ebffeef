//! Exclusion globs for filesystem watches.
//!
//! Paths matching these globs never produce change signals. Matching is
//! gitignore-style (the `ignore` crate), so directory patterns like
//! `node_modules/` swallow everything beneath them and `.*` catches
//! dotfiles at any depth.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::Result;

/// Compiled exclusion globs rooted at a watch directory.
#[derive(Debug)]
pub struct WatchIgnore {
    root: PathBuf,
    matcher: Gitignore,
}

impl WatchIgnore {
    /// Compile `patterns` against `root`.
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder.add_line(None, pattern)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            matcher: builder.build()?,
        })
    }

    /// Whether `path` (or any of its ancestors under the root) is excluded.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if !path.starts_with(&self.root) {
            // Events outside the root are not ours to judge; let them
            // through and let the watcher's recursive scope bound them.
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, path.is_dir())
            .is_ignore()
    }
}
