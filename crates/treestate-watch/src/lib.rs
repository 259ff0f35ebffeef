//! Filesystem watching for the treestate engine.
//!
//! Two concerns live here, both deliberately ignorant of git:
//!
//! - **Watching**: [`NotifyWatcher`] binds a recursive `notify` watcher to a
//!   root directory, filters events through gitignore-style exclusion globs,
//!   and collapses everything that survives into a bare "something changed"
//!   signal. Which path changed, and how, is irrelevant downstream.
//! - **Debouncing**: [`ChangeCoordinator`] turns bursts of those signals
//!   into a single quiet-period callback: a trailing debounce, so a stream
//!   of changes that never pauses produces no refresh until it stops.

pub mod debounce;
pub mod error;
pub mod exclude;
pub mod watcher;

pub use debounce::{ChangeCoordinator, QuietAction, QuietFuture};
pub use error::{Error, Result};
pub use exclude::WatchIgnore;
pub use watcher::{ChangeSink, NotifyWatcher, PathWatcher, WatchHandle};
