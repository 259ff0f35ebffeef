//! Canonical working-tree status model.
//!
//! These DTOs are what subscribers receive. They are created fresh on every
//! successful refresh and never mutated; a new status fully replaces the
//! previous one. Serialization uses camelCase field names because the
//! payloads cross an IPC boundary into a UI.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use treestate_git::{RawLog, RawLogEntry, RawStatus, RawStatusEntry};

/// Per-file status with raw porcelain codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusEntry {
    /// Path relative to the repository root
    pub path: PathBuf,

    /// Index (staging area) status code
    pub index_status: char,

    /// Working-directory status code
    pub working_dir_status: char,

    /// Origin path for rename entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<PathBuf>,
}

impl From<RawStatusEntry> for FileStatusEntry {
    fn from(raw: RawStatusEntry) -> Self {
        Self {
            path: raw.path,
            index_status: raw.index,
            working_dir_status: raw.workdir,
            renamed_from: raw.renamed_from,
        }
    }
}

/// Snapshot of a working tree's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingTreeStatus {
    /// Current branch name (`HEAD` when detached, empty if unknown)
    pub current_branch: String,

    /// Upstream tracking branch, empty when none is configured
    pub tracking_branch: String,

    /// Commits ahead of the tracking branch
    pub ahead: usize,

    /// Commits behind the tracking branch
    pub behind: usize,

    /// Paths with index-side changes
    pub staged: Vec<PathBuf>,

    /// Untracked paths
    pub not_added: Vec<PathBuf>,

    /// Paths newly added to the index
    pub created: Vec<PathBuf>,

    /// Paths with content changes
    pub modified: Vec<PathBuf>,

    /// Deleted paths
    pub deleted: Vec<PathBuf>,

    /// Unmerged paths
    pub conflicted: Vec<PathBuf>,

    /// Every entry with its raw status codes
    pub files: Vec<FileStatusEntry>,

    /// True iff every category list is empty
    pub is_clean: bool,

    /// HEAD points at a commit rather than a branch
    pub detached: bool,
}

impl WorkingTreeStatus {
    /// Select the driver-parsed fields and derive `is_clean`.
    ///
    /// No porcelain parsing happens here; that is the driver's job.
    pub fn from_raw(raw: RawStatus) -> Self {
        let is_clean = raw.staged.is_empty()
            && raw.not_added.is_empty()
            && raw.created.is_empty()
            && raw.modified.is_empty()
            && raw.deleted.is_empty()
            && raw.conflicted.is_empty();

        Self {
            current_branch: raw.current.unwrap_or_default(),
            tracking_branch: raw.tracking.unwrap_or_default(),
            ahead: raw.ahead,
            behind: raw.behind,
            staged: raw.staged,
            not_added: raw.not_added,
            created: raw.created,
            modified: raw.modified,
            deleted: raw.deleted,
            conflicted: raw.conflicted,
            files: raw.entries.into_iter().map(FileStatusEntry::from).collect(),
            is_clean,
            detached: raw.detached,
        }
    }
}

/// One commit from a log query. Read-only projection, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub hash: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub refs: String,
    pub author_name: String,
    pub author_email: String,
}

impl From<RawLogEntry> for CommitRecord {
    fn from(raw: RawLogEntry) -> Self {
        Self {
            hash: raw.hash,
            date: raw.date,
            message: raw.message,
            refs: raw.refs,
            author_name: raw.author_name,
            author_email: raw.author_email,
        }
    }
}

impl CommitRecord {
    /// Map a raw log, preserving the driver's reverse-chronological order.
    pub fn list_from_raw(raw: RawLog) -> Vec<Self> {
        raw.entries.into_iter().map(Self::from).collect()
    }
}
