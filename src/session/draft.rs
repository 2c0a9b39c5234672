use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Trailing-edge debouncer for draft saves
///
/// Each `schedule` replaces (and aborts) the pending save, so the save runs
/// once, `delay` after the last edit.
#[derive(Debug)]
pub struct DraftScheduler {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DraftScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            save.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DraftScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
