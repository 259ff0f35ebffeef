//! notify-backed filesystem watch adapter.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use notify::event::EventKind;
use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};

use crate::exclude::WatchIgnore;
use crate::{Error, Result};

/// Receiver for "something changed" signals. Carries no path or kind; the
/// downstream refresh recomputes the full status either way.
pub type ChangeSink = Arc<dyn Fn() + Send + Sync>;

/// Recursive watch over a root directory.
pub trait PathWatcher: Send + Sync {
    /// Bind a watch to `root`, dropping events whose paths match
    /// `ignore_globs`, and forward everything else to `sink`.
    fn watch(
        &self,
        root: &Path,
        ignore_globs: &[String],
        sink: ChangeSink,
    ) -> Result<Box<dyn WatchHandle>>;
}

/// Live watch started by [`PathWatcher::watch`].
pub trait WatchHandle: Send + Sync + std::fmt::Debug {
    /// Release the native watch. Synchronous and idempotent; once it
    /// returns, no further event reaches the sink.
    fn close(&self);
}

/// [`PathWatcher`] implementation on the `notify` crate's recommended
/// platform backend.
#[derive(Debug, Default)]
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl PathWatcher for NotifyWatcher {
    fn watch(
        &self,
        root: &Path,
        ignore_globs: &[String],
        sink: ChangeSink,
    ) -> Result<Box<dyn WatchHandle>> {
        let rules = WatchIgnore::new(root, ignore_globs)?;
        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = Arc::clone(&closed);

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if closed_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    if !is_change(&event.kind) {
                        return;
                    }
                    // Events with no paths (e.g. rescans) count as changes.
                    let survives =
                        event.paths.is_empty() || event.paths.iter().any(|p| !rules.is_ignored(p));
                    if survives {
                        sink();
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "filesystem watcher error");
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|source| Error::Bind {
            path: root.to_path_buf(),
            source,
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| Error::Bind {
                path: root.to_path_buf(),
                source,
            })?;

        tracing::debug!(root = %root.display(), "filesystem watch bound");

        Ok(Box::new(NotifyHandle {
            closed,
            watcher: Mutex::new(Some(watcher)),
        }))
    }
}

/// Creations, modifications, and removals are changes; access notifications
/// and catch-all kinds are not.
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

struct NotifyHandle {
    closed: Arc<AtomicBool>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl std::fmt::Debug for NotifyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyHandle")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl WatchHandle for NotifyHandle {
    fn close(&self) {
        // Flag first: the native callback thread may be mid-event while the
        // watcher is being dropped.
        self.closed.store(true, Ordering::SeqCst);
        let taken = self
            .watcher
            .lock()
            .expect("watcher lock poisoned")
            .take();
        // Dropping the notify watcher releases the native handles.
        drop(taken);
    }
}

impl Drop for NotifyHandle {
    fn drop(&mut self) {
        self.close();
    }
}
