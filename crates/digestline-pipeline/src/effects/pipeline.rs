use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::data::{PipelineOptions, PipelineSummary};
use crate::effects::{Processor, Sequencer, WorkerPool, feed_lines};
use crate::error::{PipelineError, Result};

/// Wires the source, worker pool and sequencer together and owns shutdown ordering.
///
/// A run goes through these steps in order:
/// 1. start the workers, which block on the empty intake queue
/// 2. start the source, which closes the intake once the input is exhausted
/// 3. start the sequencer
/// 4. wait for every worker to exit
/// 5. close the result queue
/// 6. wait for the sequencer to drain and flush
///
/// The first fatal error from any component cancels the others. The run
/// returns only after every task has stopped.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self { Self { options } }

    pub fn options(&self) -> &PipelineOptions { &self.options }

    /// Process the lines of `input` into `output`.
    ///
    /// The input is opened before the output is created, so an unreadable
    /// input leaves no output file behind. An existing output is truncated.
    /// A fatal error after the output was created removes it again, so a
    /// failed run never leaves partial output.
    pub async fn run_files<P>(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        processor: P,
    ) -> Result<PipelineSummary>
    where
        P: Processor<String>,
        P::Output: fmt::Display + fmt::Debug,
    {
        let (input, output) = (input.as_ref(), output.as_ref());

        let reader = File::open(input).await.map_err(|source| PipelineError::InputOpen {
            path: input.to_path_buf(),
            source,
        })?;
        let writer = File::create(output).await.map_err(|source| PipelineError::OutputCreate {
            path: output.to_path_buf(),
            source,
        })?;

        let (summary, _) = match self.run(BufReader::new(reader), writer, processor).await {
            Ok(done) => done,
            Err(e) => {
                discard_output(output).await;
                return Err(e);
            }
        };
        info!(path = %output.display(), records = summary.written, "file written successfully");
        Ok(summary)
    }

    /// Process the lines of `input` into `output` and hand the writer back.
    pub async fn run<I, W, P>(&self, input: I, output: W, processor: P) -> Result<(PipelineSummary, W)>
    where
        I: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
        P: Processor<String>,
        P::Output: fmt::Display + fmt::Debug,
    {
        let num_workers = self.options.num_workers;
        info!(num_workers = num_workers.get(), "number of worker threads");

        let cancel = CancellationToken::new();
        let (intake_tx, intake_rx) = mpsc::channel(self.options.intake_capacity.get());
        let (result_tx, result_rx) = mpsc::channel(self.options.result_capacity.get());

        let pool = WorkerPool::spawn(num_workers, Arc::new(processor), intake_rx, &result_tx, &cancel);

        let source = tokio::spawn(cancel_on_error(
            cancel.clone(),
            feed_lines(input, intake_tx, cancel.clone()),
        ));

        let sequencer = Sequencer::new(output).with_options(&self.options);
        let sequencer = tokio::spawn(cancel_on_error(
            cancel.clone(),
            sequencer.run(result_rx, cancel.clone()),
        ));

        let workers = pool.join().await;
        drop(result_tx);
        info!("finished working");

        let source = source.await.map_err(PipelineError::TaskFailed).and_then(|r| r);
        let sequencer = sequencer.await.map_err(PipelineError::TaskFailed).and_then(|r| r);
        info!("finished writing");

        match (source, workers, sequencer) {
            (Ok(produced), Ok(()), Ok((report, writer))) => {
                if report.written != produced {
                    return Err(PipelineError::Incomplete {
                        produced,
                        written: report.written,
                    });
                }
                let summary = PipelineSummary {
                    produced,
                    written: report.written,
                    failed: report.failed,
                    reorder_high_water: report.reorder_high_water,
                };
                Ok((summary, writer))
            }
            (source, workers, sequencer) => {
                let errors = [source.err(), workers.err(), sequencer.err()];
                Err(root_cause(errors.into_iter().flatten()))
            }
        }
    }
}

async fn discard_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => warn!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial output"),
    }
}

async fn cancel_on_error<T>(cancel: CancellationToken, task: impl Future<Output = Result<T>>) -> Result<T> {
    let result = task.await;
    if let Err(ref e) = result
        && !e.is_cancelled()
    {
        error!(error = %e, "aborting pipeline");
        cancel.cancel();
    }
    result
}

/// The first error that is not merely a reaction to cancellation.
fn root_cause(errors: impl IntoIterator<Item = PipelineError>) -> PipelineError {
    let mut cancelled = None;
    for e in errors {
        if e.is_cancelled() {
            cancelled.get_or_insert(e);
        } else {
            return e;
        }
    }
    cancelled.unwrap_or(PipelineError::Cancelled)
}
