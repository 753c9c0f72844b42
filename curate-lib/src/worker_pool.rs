//! Worker pool for concurrent processing with backpressure.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results are sent to an unbounded channel for consumption
//! by the caller.
//!
//! `async-channel`'s `Receiver` is `Clone`, so each worker gets its own
//! handle and no worker can starve the others while waiting on `recv()`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A pool of worker tasks that process items concurrently.
///
/// Every submitted item produces exactly one result. Results arrive in
/// completion order; callers that need submission order should tag items
/// with their index (see [`WorkerPool::run_ordered`]).
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, items, |item| async move {
///     process(item).await
/// });
///
/// while let Some(result) = pool.recv().await {
///     handle(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers (at least one), submit all items, and return a pool
    /// for receiving results.
    ///
    /// Submission happens in a background task so the caller can start
    /// receiving results immediately.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        let r = process_fn(item).await;
                        if result_tx.send(r).is_err() {
                            break; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // Channel closes once every worker has finished
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Self {
            result_rx,
            _handles: handles,
        }
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }
}

impl<R: Send + 'static> WorkerPool<(usize, R)> {
    /// Process `items` on `n` workers and return the results in submission
    /// order. `on_result` sees each result as it completes.
    pub async fn run_ordered<W, F, Fut>(
        n: usize,
        items: Vec<W>,
        process_fn: F,
        mut on_result: impl FnMut(usize, &R),
    ) -> Vec<R>
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = items.len();
        let process_fn = Arc::new(process_fn);
        let indexed: Vec<(usize, W)> = items.into_iter().enumerate().collect();
        let mut pool = WorkerPool::start(n, indexed, move |(i, item)| {
            let fut = process_fn(item);
            async move { (i, fut.await) }
        });

        let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
        let mut done = 0usize;
        while let Some((i, r)) = pool.recv().await {
            done += 1;
            on_result(done, &r);
            slots[i] = Some(r);
        }
        slots.into_iter().flatten().collect()
    }
}
