//! Git command driver for the treestate engine.
//!
//! Executes git subcommands as asynchronous subprocesses and parses their
//! machine-readable output. The engine above this crate never spawns git
//! itself; it talks to the [`GitDriver`] trait, for which [`GitCli`] is the
//! production implementation.

pub mod cli;
pub mod driver;
pub mod error;
pub mod log;
pub mod porcelain;

pub use cli::GitCli;
pub use driver::{GitDriver, LogOptions};
pub use error::{Error, Result};
pub use log::{RawLog, RawLogEntry};
pub use porcelain::{RawStatus, RawStatusEntry};
