use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Boxed future produced by a [`WorkFn`].
pub type WorkFuture<R> = Pin<Box<dyn Future<Output = R> + Send + 'static>>;

/// Shared reference to a unit-of-work function.
///
/// Cloning is an `Arc` bump, so the same function can be submitted many times.
pub type WorkFn<A, R> = Arc<dyn Fn(A) -> WorkFuture<R> + Send + Sync + 'static>;

/// Outcome delivered on a work item's result channel.
pub type WorkResult<R> = std::result::Result<R, WorkError>;

/// Receiving half of a work item's single-shot result channel.
pub type ResultReceiver<R> = oneshot::Receiver<WorkResult<R>>;

/// Wraps an async closure into a [`WorkFn`].
pub fn work_fn<A, R, F, Fut>(f: F) -> WorkFn<A, R>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    Arc::new(move |arg| Box::pin(f(arg)) as WorkFuture<R>)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkError {
    #[error("work function panicked: {0}")]
    Panicked(String),
}

pub(crate) struct WorkItem<A, R> {
    pub(crate) id: u64,
    pub(crate) func: Option<WorkFn<A, R>>,
    pub(crate) arg: Option<A>,
    pub(crate) result_tx: Option<oneshot::Sender<WorkResult<R>>>,
}

impl<A, R> WorkItem<A, R> {
    fn empty() -> Self {
        Self {
            id: 0,
            func: None,
            arg: None,
            result_tx: None,
        }
    }

    pub(crate) fn init(
        &mut self,
        id: u64,
        func: WorkFn<A, R>,
        arg: A,
        result_tx: oneshot::Sender<WorkResult<R>>,
    ) {
        self.id = id;
        self.func = Some(func);
        self.arg = Some(arg);
        self.result_tx = Some(result_tx);
    }

    /// Drops every transient reference so a parked item pins nothing.
    pub(crate) fn clear(&mut self) {
        self.id = 0;
        self.func = None;
        self.arg = None;
        self.result_tx = None;
    }

    #[cfg(test)]
    pub(crate) fn is_clear(&self) -> bool {
        self.id == 0 && self.func.is_none() && self.arg.is_none() && self.result_tx.is_none()
    }
}

/// Bounded stack of cleared work items reused across submissions.
pub(crate) struct FreeList<A, R> {
    items: Mutex<Vec<Box<WorkItem<A, R>>>>,
    cap: usize,
}

impl<A, R> FreeList<A, R> {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(cap.min(64))),
            cap,
        }
    }

    pub(crate) fn take(&self) -> Box<WorkItem<A, R>> {
        self.items
            .lock()
            .pop()
            .unwrap_or_else(|| Box::new(WorkItem::empty()))
    }

    pub(crate) fn put(&self, mut item: Box<WorkItem<A, R>>) {
        item.clear();
        let mut items = self.items.lock();
        if items.len() < self.cap {
            items.push(item);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn work_fn_boxes_async_closures() {
        let double: WorkFn<u32, u32> = work_fn(|x: u32| async move { x * 2 });
        assert_eq!(double(21).await, 42);
    }

    #[test]
    fn free_list_recycles_cleared_items() {
        let list: FreeList<String, String> = FreeList::new(4);
        let mut item = list.take();
        let (tx, _rx) = oneshot::channel();
        item.init(7, work_fn(|s: String| async move { s }), "arg".into(), tx);
        assert!(!item.is_clear());

        list.put(item);
        assert_eq!(list.len(), 1);

        let reused = list.take();
        assert!(reused.is_clear());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn free_list_is_bounded() {
        let list: FreeList<(), ()> = FreeList::new(2);
        for _ in 0..5 {
            list.put(Box::new(WorkItem::empty()));
        }
        assert_eq!(list.len(), 2);
    }
}
