use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::data::{IndexedItem, IndexedResult, Outcome};
use crate::effects::Processor;
use crate::error::{PipelineError, Result};

type SharedIntake<T> = Arc<Mutex<mpsc::Receiver<IndexedItem<T>>>>;

/// A fixed set of workers draining one intake queue into one result queue.
///
/// Each item is received by exactly one worker, so the processor runs once per
/// item. Results are emitted in completion order, not input order.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Start `num_workers` workers.
    ///
    /// Each worker holds its own clone of `results`; the result queue closes
    /// once every worker has exited and the caller drops its sender.
    pub fn spawn<T, P>(
        num_workers: NonZeroUsize,
        processor: Arc<P>,
        intake: mpsc::Receiver<IndexedItem<T>>,
        results: &mpsc::Sender<IndexedResult<P::Output>>,
        cancel: &CancellationToken,
    ) -> Self
    where
        T: fmt::Debug + Send + 'static,
        P: Processor<T>,
        P::Output: fmt::Debug,
    {
        let intake: SharedIntake<T> = Arc::new(Mutex::new(intake));
        let handles = (1..=num_workers.get())
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&processor),
                    Arc::clone(&intake),
                    results.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        Self {
            handles,
            cancel: cancel.clone(),
        }
    }

    pub fn len(&self) -> usize { self.handles.len() }

    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    /// Wait for every worker to exit.
    ///
    /// A panicked worker cancels the rest of the pipeline; the first panic is returned.
    pub async fn join(self) -> Result<()> {
        let mut first = None;
        for (i, handle) in self.handles.into_iter().enumerate() {
            if let Err(source) = handle.await {
                self.cancel.cancel();
                first.get_or_insert(PipelineError::WorkerPanicked { worker: i + 1, source });
            }
        }
        first.map_or(Ok(()), Err)
    }
}

async fn run_worker<T, P>(
    worker: usize,
    processor: Arc<P>,
    intake: SharedIntake<T>,
    results: mpsc::Sender<IndexedResult<P::Output>>,
    cancel: CancellationToken,
) where
    T: fmt::Debug + Send + 'static,
    P: Processor<T>,
    P::Output: fmt::Debug,
{
    loop {
        let next = {
            let mut rx = intake.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                item = rx.recv() => item,
            }
        };
        let Some(IndexedItem { index, payload }) = next else {
            break;
        };

        info!(worker, index, ?payload, "starting work");
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = processor.process(payload) => {
                match &result {
                    Ok(value) => info!(worker, index, result = ?value, "finished work"),
                    Err(error) => warn!(worker, index, %error, "processing failed"),
                }
                Outcome::from(result)
            }
        };

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = results.send(IndexedResult::new(index, value)) => sent,
        };
        if sent.is_err() {
            debug!(worker, "result queue closed");
            break;
        }
    }

    debug!(worker, "worker exiting");
}
