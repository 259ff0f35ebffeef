//! Trailing debounce for change signals.
//!
//! A burst of filesystem events should produce one refresh, computed after
//! the tree has gone quiet. A partial view mid-burst is worse than a
//! slightly later complete one. The coordinator therefore (re)arms a quiet
//! window on every signal and runs its action only when a full window
//! elapses with no new signal.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Future returned by a quiet action.
pub type QuietFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback invoked once per quiet period. Must not fail: anything fallible
/// inside handles its own errors.
pub type QuietAction = Arc<dyn Fn() -> QuietFuture + Send + Sync>;

enum Signal {
    Changed,
    Cancel,
}

/// Debounces change signals into single quiet-period callbacks.
///
/// `notify` and `cancel` are synchronous and cheap, callable from non-async
/// contexts such as a native watcher's callback thread. At most one quiet
/// window is ever armed. Must be created inside a tokio runtime.
pub struct ChangeCoordinator {
    tx: mpsc::UnboundedSender<Signal>,
    quiet_period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeCoordinator {
    /// Spawn the coordinator loop with the given quiet period and action.
    pub fn new(quiet_period: Duration, action: QuietAction) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(quiet_period, rx, action));
        Self {
            tx,
            quiet_period,
            task: Mutex::new(Some(task)),
        }
    }

    /// Record that something changed, (re)arming the quiet window.
    pub fn notify(&self) {
        let _ = self.tx.send(Signal::Changed);
    }

    /// Disarm any pending quiet window without firing.
    pub fn cancel(&self) {
        let _ = self.tx.send(Signal::Cancel);
    }

    /// The configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Stop the loop for good. No action fires after this returns.
    /// Idempotent.
    pub async fn shutdown(&self) {
        let task = self.task.lock().expect("coordinator task lock poisoned").take();
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }
    }
}

async fn run_loop(quiet: Duration, mut rx: mpsc::UnboundedReceiver<Signal>, action: QuietAction) {
    let mut pending = false;
    loop {
        let signal = if pending {
            match timeout(quiet, rx.recv()).await {
                Ok(signal) => signal,
                Err(_elapsed) => {
                    pending = false;
                    action().await;
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match signal {
            Some(Signal::Changed) => pending = true,
            Some(Signal::Cancel) => pending = false,
            // Sender dropped: nothing further can arrive, and a window
            // without an owner must not fire.
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_action() -> (Arc<AtomicUsize>, QuietAction) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let action: QuietAction = Arc::new(move || {
            let inner = Arc::clone(&inner);
            Box::pin(async move {
                inner.fetch_add(1, Ordering::SeqCst);
            }) as QuietFuture
        });
        (count, action)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_exactly_once_quiet_period_after_the_last_signal() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        // Five signals 100ms apart, every gap shorter than the window.
        for _ in 0..4 {
            coordinator.notify();
            sleep(Duration::from_millis(100)).await;
        }
        coordinator.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Just before the window closes: still nothing.
        sleep(Duration::from_millis(299)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Quiet afterwards: no second firing from the same burst.
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        coordinator.notify();
        sleep(Duration::from_millis(301)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        coordinator.notify();
        sleep(Duration::from_millis(301)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_disarms_the_pending_window() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        coordinator.notify();
        sleep(Duration::from_millis(100)).await;
        coordinator.cancel();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_does_not_break_later_bursts() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        coordinator.notify();
        coordinator.cancel();
        coordinator.notify();
        sleep(Duration::from_millis(301)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_within_the_window_prevents_the_firing() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        coordinator.notify();
        sleep(Duration::from_millis(100)).await;
        coordinator.shutdown().await;
        coordinator.shutdown().await; // idempotent

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_coordinator_prevents_the_firing() {
        let (count, action) = counting_action();
        let coordinator = ChangeCoordinator::new(Duration::from_millis(300), action);

        coordinator.notify();
        drop(coordinator);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
