use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    notify: Notify,
}

impl Inner {
    fn release(&self) {
        match self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.notify.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("wait group released more units than were added"),
        }
    }
}

/// Completion counter the driver blocks on until every submitted job is done.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

/// Outstanding unit of a [`WaitGroup`]; dropping it marks the unit done.
#[derive(Debug)]
pub struct WaitGroupGuard {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` pending units; each is completed by one [`WaitGroup::done`].
    pub fn add(&self, n: usize) {
        self.inner.pending.fetch_add(n, Ordering::AcqRel);
    }

    /// Completes one unit added with [`WaitGroup::add`]. Extra calls leave the count at zero.
    pub fn done(&self) {
        self.inner.release();
    }

    /// Adds one pending unit and returns the guard that completes it.
    pub fn guard(&self) -> WaitGroupGuard {
        self.add(1);
        WaitGroupGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Resolves once the pending count reaches zero.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.pending.load(Ordering::Acquire) == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Drop for WaitGroupGuard {
    fn drop(&mut self) {
        self.inner.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_group_resolves_immediately() {
        let wg = WaitGroup::new();
        wg.wait().await;
        assert_eq!(wg.pending(), 0);
    }

    #[tokio::test]
    async fn guards_count_up_and_down() {
        let wg = WaitGroup::new();
        let a = wg.guard();
        let b = wg.guard();
        assert_eq!(wg.pending(), 2);

        drop(a);
        assert_eq!(wg.pending(), 1);
        drop(b);
        assert_eq!(wg.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn wait_returns_after_last_guard_drops() {
        let wg = WaitGroup::new();
        let guards: Vec<_> = (0..16).map(|_| wg.guard()).collect();

        for (i, guard) in guards.into_iter().enumerate() {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i as u64)).await;
                drop(guard);
            });
        }

        tokio::time::timeout(Duration::from_secs(5), wg.wait())
            .await
            .unwrap_or_else(|_| panic!("wait group never drained"));
        assert_eq!(wg.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn add_and_done_pair_up() {
        let wg = WaitGroup::new();
        wg.add(3);
        assert_eq!(wg.pending(), 3);

        for _ in 0..3 {
            let wg = wg.clone();
            tokio::spawn(async move { wg.done() });
        }

        tokio::time::timeout(Duration::from_secs(5), wg.wait())
            .await
            .unwrap_or_else(|_| panic!("wait group never drained"));
        assert_eq!(wg.pending(), 0);
    }

    #[tokio::test]
    async fn extra_done_does_not_underflow() {
        let wg = WaitGroup::new();
        wg.done();
        assert_eq!(wg.pending(), 0);

        let guard = wg.guard();
        assert_eq!(wg.pending(), 1);
        drop(guard);
        wg.wait().await;
    }

    #[tokio::test]
    async fn guard_released_by_panicking_task() {
        let wg = WaitGroup::new();
        let guard = wg.guard();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("task failed");
        });
        assert!(handle.await.is_err());

        wg.wait().await;
    }
}
