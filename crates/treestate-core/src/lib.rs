//! Working-tree status synchronization engine.
//!
//! Keeps a view of a git working tree continuously up to date: bind to a
//! root, watch the filesystem, coalesce bursts of changes into single
//! refreshes, query git, and broadcast the resulting status. Mutating
//! operations (stage, unstage, commit, discard) push a fresh status on
//! success so the UI never waits out a debounce window for its own action.
//!
//! # Architecture
//!
//! `treestate-core` sits above the driver and watcher crates and below
//! whatever transports events to consumers (IPC, HTTP, and the like are
//! all just subscribers):
//!
//! ```text
//!        subscribers (UI transports)
//!                   |
//!             treestate-core
//!            /              \
//!     treestate-git    treestate-watch
//! ```
//!
//! Control flow: filesystem events → debounce → refresh → git status →
//! mapping → broadcast. The engine is an explicit instance owned by the
//! application composition root; there is no global state.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod status;

pub use config::EngineConfig;
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use notifier::{StatusEvent, StatusNotifier};
pub use status::{CommitRecord, FileStatusEntry, WorkingTreeStatus};
