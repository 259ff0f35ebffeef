//! SyncEngine implementation.
//!
//! The engine owns the root binding and its lifecycle, wires the filesystem
//! watch into the debounce coordinator, serializes mutating git calls, and
//! exposes the public operation surface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use treestate_git::{GitDriver, LogOptions};
use treestate_watch::{ChangeCoordinator, ChangeSink, PathWatcher, QuietFuture, WatchHandle};

use crate::config::EngineConfig;
use crate::notifier::{StatusEvent, StatusNotifier};
use crate::status::{CommitRecord, WorkingTreeStatus};
use crate::{Error, Result};

/// Live binding to a repository root. At most one exists per engine; a
/// rebind closes the previous watch before anything touches the new root.
struct RootBinding {
    root: PathBuf,
    watcher: Box<dyn WatchHandle>,
}

enum Lifecycle {
    Uninitialized,
    Bound(RootBinding),
    Disposed,
}

/// Working-tree status synchronization engine.
///
/// An explicit instance with an explicit lifecycle: construct it with an
/// injected driver and watcher, `initialize` it against a repository root,
/// `dispose` it when done. `Disposed` is terminal.
///
/// The write side of the internal lock doubles as the FIFO queue for
/// mutating git calls: the git binary takes its own index lock, and two
/// mutations racing each other would trip over it. Reads (`get_status`,
/// `get_log`, the debounced refresh) are idempotent and run concurrently.
pub struct SyncEngine {
    driver: Arc<dyn GitDriver>,
    watcher: Arc<dyn PathWatcher>,
    config: EngineConfig,
    notifier: StatusNotifier,
    coordinator: Arc<ChangeCoordinator>,
    state: Arc<RwLock<Lifecycle>>,
}

impl SyncEngine {
    /// Create an engine in the `Uninitialized` state.
    ///
    /// Must be called inside a tokio runtime: the debounce coordinator
    /// spawns its loop task here.
    pub fn new(
        driver: Arc<dyn GitDriver>,
        watcher: Arc<dyn PathWatcher>,
        config: EngineConfig,
    ) -> Self {
        let notifier = StatusNotifier::new(config.event_buffer);
        let state = Arc::new(RwLock::new(Lifecycle::Uninitialized));

        let coordinator = {
            let driver = Arc::clone(&driver);
            let state = Arc::clone(&state);
            let notifier = notifier.clone();
            Arc::new(ChangeCoordinator::new(
                config.quiet_period(),
                Arc::new(move || {
                    let driver = Arc::clone(&driver);
                    let state = Arc::clone(&state);
                    let notifier = notifier.clone();
                    Box::pin(async move {
                        refresh_and_notify(&driver, &state, &notifier).await;
                    }) as QuietFuture
                }),
            ))
        };

        Self {
            driver,
            watcher,
            config,
            notifier,
            coordinator,
            state,
        }
    }

    /// Register a subscriber for `status-changed` events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.notifier.subscribe()
    }

    /// Bind to a repository root and return the initial status snapshot.
    ///
    /// Verification happens before any watch binds: a directory that is not
    /// a confirmed repository is never watched. On failure the engine is
    /// `Uninitialized` with no live watch and no armed debounce window,
    /// never partially bound. Re-initializing against a new root first
    /// fully closes the previous watch, so events from the old root cannot
    /// reach the coordinator once the switch completes. Overlapping calls
    /// queue behind each other on the write lock.
    pub async fn initialize(&self, root: impl AsRef<Path>) -> Result<WorkingTreeStatus> {
        let mut state = self.state.write().await;
        if matches!(&*state, Lifecycle::Disposed) {
            return Err(Error::Disposed);
        }

        if let Lifecycle::Bound(binding) = std::mem::replace(&mut *state, Lifecycle::Uninitialized)
        {
            self.coordinator.cancel();
            binding.watcher.close();
            tracing::info!(root = %binding.root.display(), "unbound previous root");
        }

        let requested = root.as_ref();
        let root = dunce::canonicalize(requested).map_err(|_| Error::NotARepository {
            path: requested.to_path_buf(),
        })?;

        if !self.driver.check_is_repo(&root).await? {
            return Err(Error::NotARepository { path: root });
        }

        let handle = self
            .watcher
            .watch(&root, &self.config.ignore_globs, self.change_sink())?;

        let status = match self.driver.status(&root).await {
            Ok(raw) => WorkingTreeStatus::from_raw(raw),
            Err(err) => {
                handle.close();
                return Err(err.into());
            }
        };

        tracing::info!(root = %root.display(), "bound repository root");
        *state = Lifecycle::Bound(RootBinding {
            root,
            watcher: handle,
        });
        Ok(status)
    }

    /// Whether `path` is a git repository. Valid in any non-disposed state.
    pub async fn check_is_repo(&self, path: impl AsRef<Path>) -> Result<bool> {
        self.ensure_not_disposed().await?;
        Ok(self.driver.check_is_repo(path.as_ref()).await?)
    }

    /// Initialize a new repository at `path`. Valid in any non-disposed
    /// state; does not bind the engine to it.
    pub async fn init_repo(&self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_not_disposed().await?;
        self.driver.init(path.as_ref()).await?;
        Ok(())
    }

    /// Current full status of the bound root.
    ///
    /// Driver failures propagate; they are never converted into an
    /// empty-but-clean status.
    pub async fn get_status(&self) -> Result<WorkingTreeStatus> {
        let root = self.bound_root().await?;
        let raw = self.driver.status(&root).await?;
        Ok(WorkingTreeStatus::from_raw(raw))
    }

    /// Stage the given paths.
    pub async fn add(&self, paths: &[String]) -> Result<()> {
        let state = self.state.write().await;
        let root = Self::root_of(&state)?;
        self.driver.add(&root, paths).await?;
        drop(state);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Alias for [`add`](Self::add) under the staging vocabulary.
    pub async fn stage(&self, paths: &[String]) -> Result<()> {
        self.add(paths).await
    }

    /// Remove the given paths from the index.
    pub async fn unstage(&self, paths: &[String]) -> Result<()> {
        let state = self.state.write().await;
        let root = Self::root_of(&state)?;
        let mut args = vec!["HEAD".to_string(), "--".to_string()];
        args.extend(paths.iter().cloned());
        self.driver.reset(&root, &args).await?;
        drop(state);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Stage every change in the working tree.
    pub async fn stage_all(&self) -> Result<()> {
        self.add(&[".".to_string()]).await
    }

    /// Empty the index.
    ///
    /// A repository with zero commits has no `HEAD` to reset against, so
    /// the reset form is chosen by whether any history exists.
    pub async fn unstage_all(&self) -> Result<()> {
        let state = self.state.write().await;
        let root = Self::root_of(&state)?;
        let history = self.driver.log(&root, &LogOptions::head_only()).await?;
        if history.entries.is_empty() {
            self.driver.reset(&root, &[]).await?;
        } else {
            self.driver.reset(&root, &["HEAD".to_string()]).await?;
        }
        drop(state);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Restore every tracked file to its HEAD content. Untracked files are
    /// left alone.
    pub async fn discard_all(&self) -> Result<()> {
        let state = self.state.write().await;
        let root = Self::root_of(&state)?;
        self.driver
            .checkout(&root, &["--".to_string(), ".".to_string()])
            .await?;
        drop(state);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Record a commit with the given message.
    pub async fn commit(&self, message: &str) -> Result<()> {
        let state = self.state.write().await;
        let root = Self::root_of(&state)?;
        self.driver.commit(&root, message).await?;
        drop(state);
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Commit history of the bound root, most recent first.
    pub async fn get_log(&self) -> Result<Vec<CommitRecord>> {
        let root = self.bound_root().await?;
        let options = LogOptions {
            max_count: self.config.log_limit,
        };
        let raw = self.driver.log(&root, &options).await?;
        Ok(CommitRecord::list_from_raw(raw))
    }

    /// Tear the engine down. Idempotent; `Disposed` is terminal.
    ///
    /// When this returns, the watch is released, no debounce window is
    /// armed, and no refresh will ever fire again.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.write().await;
            if matches!(&*state, Lifecycle::Disposed) {
                return;
            }
            if let Lifecycle::Bound(binding) =
                std::mem::replace(&mut *state, Lifecycle::Disposed)
            {
                binding.watcher.close();
                tracing::info!(root = %binding.root.display(), "disposed engine");
            }
        }
        self.coordinator.shutdown().await;
    }

    fn root_of(state: &Lifecycle) -> Result<PathBuf> {
        match state {
            Lifecycle::Uninitialized => Err(Error::NotInitialized),
            Lifecycle::Disposed => Err(Error::Disposed),
            Lifecycle::Bound(binding) => Ok(binding.root.clone()),
        }
    }

    async fn bound_root(&self) -> Result<PathBuf> {
        Self::root_of(&*self.state.read().await)
    }

    async fn ensure_not_disposed(&self) -> Result<()> {
        if matches!(&*self.state.read().await, Lifecycle::Disposed) {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    /// Sink handed to the watcher. Holds the coordinator weakly so a
    /// lingering watch callback can never keep a dropped engine alive.
    fn change_sink(&self) -> ChangeSink {
        let coordinator = Arc::downgrade(&self.coordinator);
        Arc::new(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                coordinator.notify();
            }
        })
    }

    /// The mutation just changed the tree; the watcher will notice too, but
    /// pushing now spares the UI a full debounce window of lag.
    async fn refresh_after_mutation(&self) {
        refresh_and_notify(&self.driver, &self.state, &self.notifier).await;
    }
}

/// Recompute the status for the bound root and broadcast the outcome.
///
/// Failures here are logged and emitted as error envelopes; they never
/// propagate and never stop later refreshes from running.
async fn refresh_and_notify(
    driver: &Arc<dyn GitDriver>,
    state: &RwLock<Lifecycle>,
    notifier: &StatusNotifier,
) {
    let root = match &*state.read().await {
        Lifecycle::Bound(binding) => binding.root.clone(),
        _ => return,
    };

    match driver.status(&root).await {
        Ok(raw) => notifier.emit(StatusEvent::Status {
            status: WorkingTreeStatus::from_raw(raw),
        }),
        Err(err) => {
            tracing::warn!(root = %root.display(), error = %err, "status refresh failed");
            notifier.emit(StatusEvent::Error {
                message: err.to_string(),
            });
        }
    }
}
