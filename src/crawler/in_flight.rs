use std::sync::Arc;
use tokio::sync::watch;

/// Counts crawl tasks that have been admitted but not yet finished.
///
/// A task registers before it is queued and holds the returned guard until it
/// is done. A finishing task submits its children before its own guard drops,
/// so the count only reaches zero once no more work can appear.
#[derive(Clone)]
pub struct InFlight {
    count: Arc<watch::Sender<usize>>,
}

/// Decrements the in-flight count when dropped, whichever way the task ends.
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
}

impl InFlight {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    pub fn register(&self) -> InFlightGuard {
        self.count.send_modify(|count| *count += 1);
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn current(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once the count is zero. Safe to await while other tasks are
    /// still registering.
    pub async fn wait_idle(&self) {
        let mut receiver = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count -= 1);
    }
}
