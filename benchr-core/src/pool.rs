mod item;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::FutureExt as _;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;

use crate::{Error, Result};
use item::{FreeList, WorkItem};

pub use item::{ResultReceiver, WorkError, WorkFn, WorkFuture, WorkResult, work_fn};

/// Upper bound on parked work items kept for reuse.
const FREE_LIST_CAP: usize = 1024;

struct Shared<A, R> {
    queue: Mutex<VecDeque<Box<WorkItem<A, R>>>>,
    available: Notify,
    closed: AtomicBool,
    last_id: AtomicU64,
    free: FreeList<A, R>,
}

impl<A, R> Shared<A, R> {
    /// Parks until an item is queued; `None` once the pool is closed and drained.
    async fn next_item(&self) -> Option<Box<WorkItem<A, R>>> {
        loop {
            // Register before looking at the queue so a signal sent between the check and the
            // await is not lost.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queue = self.queue.lock();
                if let Some(item) = queue.pop_front() {
                    return Some(item);
                }
                if self.closed.load(Ordering::Acquire) {
                    return None;
                }
            }

            notified.await;
        }
    }

    fn close(&self) {
        let _queue = self.queue.lock();
        self.closed.store(true, Ordering::Release);
        self.available.notify_waiters();
    }
}

/// Fixed-size pool of long-lived workers draining one shared FIFO queue.
///
/// Workers are Tokio tasks. Each submission gets its own single-shot result channel; the
/// worker's send never blocks, so callers that don't care about results can drop the receiver.
pub struct WorkerPool<A, R> {
    shared: Arc<Shared<A, R>>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl<A, R> WorkerPool<A, R>
where
    A: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `size` workers on the current Tokio runtime.
    pub fn new(size: usize) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Self::with_handle(size, &handle)
    }

    pub fn with_handle(size: usize, handle: &Handle) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidPoolSize);
        }

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            closed: AtomicBool::new(false),
            last_id: AtomicU64::new(0),
            free: FreeList::new(FREE_LIST_CAP),
        });

        let workers = (0..size)
            .map(|idx| handle.spawn(worker_loop(shared.clone(), idx)))
            .collect();

        tracing::debug!(workers = size, "worker pool started");

        Ok(Self {
            shared,
            workers,
            size,
        })
    }

    /// Queues `func(arg)` and returns the channel its result will arrive on.
    ///
    /// Never blocks and never fails; the queue is unbounded.
    pub fn submit(&self, func: WorkFn<A, R>, arg: A) -> ResultReceiver<R> {
        let (tx, rx) = oneshot::channel();
        let mut item = self.shared.free.take();

        let mut queue = self.shared.queue.lock();
        // Assigned under the queue lock so id order matches dequeue order.
        let id = self.shared.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        item.init(id, func, arg, tx);
        queue.push_back(item);
        self.shared.available.notify_one();
        drop(queue);

        rx
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Items waiting for a worker.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Id handed to the most recent submission (0 before the first one).
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.shared.last_id.load(Ordering::Relaxed)
    }

    /// Stops accepting work and waits for the workers to drain the queue and exit.
    pub async fn shutdown(mut self) {
        self.shared.close();

        for worker in std::mem::take(&mut self.workers) {
            if let Err(err) = worker.await {
                tracing::warn!(error = %err, "pool worker exited abnormally");
            }
        }

        tracing::debug!(workers = self.size, "worker pool stopped");
    }
}

impl<A, R> Drop for WorkerPool<A, R> {
    fn drop(&mut self) {
        // Detached workers still finish whatever is queued before exiting.
        self.shared.close();
    }
}

async fn worker_loop<A, R>(shared: Arc<Shared<A, R>>, worker: usize)
where
    A: Send + 'static,
    R: Send + 'static,
{
    while let Some(mut item) = shared.next_item().await {
        let id = item.id;
        let (Some(func), Some(arg), Some(tx)) =
            (item.func.take(), item.arg.take(), item.result_tx.take())
        else {
            shared.free.put(item);
            continue;
        };

        let outcome = run_item(&func, arg).await;
        if let Err(err) = &outcome {
            tracing::error!(worker, job = id, error = %err, "work item failed");
        }

        // The submitter may have dropped its receiver; that's fine.
        let _ = tx.send(outcome);

        drop(func);
        shared.free.put(item);
    }
}

async fn run_item<A, R>(func: &WorkFn<A, R>, arg: A) -> WorkResult<R> {
    let fut = std::panic::catch_unwind(AssertUnwindSafe(|| func(arg))).map_err(panic_error)?;
    AssertUnwindSafe(fut).catch_unwind().await.map_err(panic_error)
}

fn panic_error(payload: Box<dyn Any + Send>) -> WorkError {
    let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    WorkError::Panicked(msg)
}
