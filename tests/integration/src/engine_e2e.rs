//! End-to-end tests: real engine, real git binary, real filesystem watcher.
//!
//! These run on wall-clock time with a shortened quiet period; every
//! positive wait has a generous timeout so slow CI machines do not flake.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;
use tokio::time::timeout;

use treestate_core::{EngineConfig, StatusEvent, SyncEngine, WorkingTreeStatus};
use treestate_git::GitCli;
use treestate_test_utils::git::real_git_repo_with_commit;
use treestate_watch::NotifyWatcher;

fn engine() -> SyncEngine {
    let config = EngineConfig {
        quiet_period_ms: 200,
        ..EngineConfig::default()
    };
    SyncEngine::new(
        Arc::new(GitCli::new()),
        Arc::new(NotifyWatcher::new()),
        config,
    )
}

/// Wait for a status emission satisfying `accept`, skipping any others.
async fn next_status(
    rx: &mut broadcast::Receiver<StatusEvent>,
    within: Duration,
    accept: impl Fn(&WorkingTreeStatus) -> bool,
) -> WorkingTreeStatus {
    timeout(within, async {
        loop {
            match rx.recv().await {
                Ok(StatusEvent::Status { status }) if accept(&status) => return status,
                Ok(_) => continue,
                Err(err) => panic!("status channel closed: {err}"),
            }
        }
    })
    .await
    .expect("no matching status event within timeout")
}

#[tokio::test(flavor = "multi_thread")]
async fn watch_stage_commit_round_trip() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    let engine = engine();

    let initial = engine.initialize(temp.path()).await.unwrap();
    assert!(initial.is_clean);
    assert_eq!(initial.current_branch, "main");

    let mut rx = engine.subscribe();

    // A plain write must surface through the watcher, debounced.
    temp.child("a.txt").write_str("hello").unwrap();
    let status = next_status(&mut rx, Duration::from_secs(10), |s| {
        s.not_added.contains(&PathBuf::from("a.txt"))
    })
    .await;
    assert!(!status.is_clean);

    // Staging pushes immediately; .git churn itself stays ignored.
    engine.stage(&["a.txt".to_string()]).await.unwrap();
    let status = next_status(&mut rx, Duration::from_secs(10), |s| {
        s.staged.contains(&PathBuf::from("a.txt"))
    })
    .await;
    assert!(status.not_added.is_empty());

    engine.commit("Add a.txt").await.unwrap();
    next_status(&mut rx, Duration::from_secs(10), |s| s.is_clean).await;

    let log = engine.get_log().await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].message, "Add a.txt");
    assert_eq!(log[1].message, "Initial commit");

    engine.dispose().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn fresh_repository_supports_unstage_all_without_history() {
    let temp = TempDir::new().unwrap();
    let engine = engine();

    engine.init_repo(temp.path()).await.unwrap();
    engine.initialize(temp.path()).await.unwrap();

    temp.child("a.txt").write_str("hello").unwrap();
    engine.stage(&["a.txt".to_string()]).await.unwrap();
    let status = engine.get_status().await.unwrap();
    assert_eq!(status.created, vec![PathBuf::from("a.txt")]);

    // No HEAD exists yet; the engine must pick the bare reset form.
    engine.unstage_all().await.unwrap();
    let status = engine.get_status().await.unwrap();
    assert!(status.staged.is_empty());
    assert_eq!(status.not_added, vec![PathBuf::from("a.txt")]);

    engine.dispose().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn a_root_switch_silences_the_previous_repository() {
    let temp_a = TempDir::new().unwrap();
    real_git_repo_with_commit(temp_a.path());
    let temp_b = TempDir::new().unwrap();
    real_git_repo_with_commit(temp_b.path());
    let engine = engine();

    engine.initialize(temp_a.path()).await.unwrap();
    engine.initialize(temp_b.path()).await.unwrap();
    let mut rx = engine.subscribe();

    // Writes in the unbound root must never surface. Only a status that
    // lists the stale file would prove a leak; spurious clean refreshes of
    // the new root are tolerated.
    temp_a.child("stale.txt").write_str("x").unwrap();
    let leak = timeout(Duration::from_millis(1500), async {
        loop {
            match rx.recv().await {
                Ok(StatusEvent::Status { status })
                    if status.not_added.contains(&PathBuf::from("stale.txt")) =>
                {
                    return;
                }
                Ok(_) => continue,
                Err(err) => panic!("status channel closed: {err}"),
            }
        }
    })
    .await;
    assert!(leak.is_err(), "event leaked from the unbound root");

    temp_b.child("fresh.txt").write_str("y").unwrap();
    let status = next_status(&mut rx, Duration::from_secs(10), |s| {
        s.not_added.contains(&PathBuf::from("fresh.txt"))
    })
    .await;
    assert!(!status.is_clean);

    engine.dispose().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn discard_all_restores_tracked_content() {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    let engine = engine();
    engine.initialize(temp.path()).await.unwrap();

    temp.child("README.md").write_str("scribbled over").unwrap();
    let status = engine.get_status().await.unwrap();
    assert_eq!(status.modified, vec![PathBuf::from("README.md")]);

    engine.discard_all().await.unwrap();
    let status = engine.get_status().await.unwrap();
    assert!(status.is_clean);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "# Test"
    );

    engine.dispose().await;
}
