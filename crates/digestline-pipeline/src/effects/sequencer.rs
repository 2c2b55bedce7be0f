use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::ReorderBuffer;
use crate::data::{IndexedResult, Outcome, PipelineOptions, Progress};
use crate::error::{PipelineError, Result};

/// Totals from a finished [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerReport {
    pub written: u64,
    pub failed: u64,
    pub reorder_high_water: usize,
}

/// The single writer of the output.
///
/// Accepts results in any order and writes one line per result in ascending
/// index order, as soon as the next expected index is available.
pub struct Sequencer<W, R> {
    writer: BufWriter<W>,
    buffer: ReorderBuffer<Outcome<R>>,
    failed: u64,
    warn_threshold: Option<usize>,
    warned: bool,
    on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl<W, R> Sequencer<W, R>
where
    W: AsyncWrite + Unpin,
    R: fmt::Display,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            buffer: ReorderBuffer::new(),
            failed: 0,
            warn_threshold: None,
            warned: false,
            on_progress: None,
        }
    }

    /// Take the reorder warning threshold and progress callback from `options`.
    #[must_use]
    pub fn with_options(mut self, options: &PipelineOptions) -> Self {
        self.warn_threshold = options.reorder_warn_threshold;
        self.on_progress = options.on_progress.clone();
        self
    }

    /// Index of the next record to be written.
    pub fn next_expected(&self) -> u64 { self.buffer.next_expected() }

    /// Results waiting for an earlier index.
    pub fn buffered(&self) -> usize { self.buffer.len() }

    /// Buffer one result, then write every result that is now contiguous.
    pub async fn accept(&mut self, result: IndexedResult<R>) -> Result<()> {
        let index = result.index;
        self.buffer.insert(index, result.value)?;
        debug!(index, buffered = self.buffer.len(), "received result");
        self.check_growth();

        while let Some((index, value)) = self.buffer.pop_ready() {
            self.write_record(index, value).await?;
        }
        Ok(())
    }

    /// Drain `results` until every sender is gone, then [`finish`](Self::finish).
    ///
    /// Returns [`PipelineError::Cancelled`] without flushing if `cancel` fires first.
    pub async fn run(
        mut self,
        mut results: mpsc::Receiver<IndexedResult<R>>,
        cancel: CancellationToken,
    ) -> Result<(SequencerReport, W)> {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                next = results.recv() => next,
            };
            match next {
                Some(result) => self.accept(result).await?,
                None => break,
            }
        }
        self.finish().await
    }

    /// Flush the output and check that nothing is left behind a missing index.
    pub async fn finish(mut self) -> Result<(SequencerReport, W)> {
        self.writer.flush().await.map_err(PipelineError::OutputFlush)?;

        let reorder_high_water = self.buffer.high_water();
        let written = self.buffer.finish()?;
        debug!(written, reorder_high_water, "sequencer drained");

        let report = SequencerReport {
            written,
            failed: self.failed,
            reorder_high_water,
        };
        Ok((report, self.writer.into_inner()))
    }

    async fn write_record(&mut self, index: u64, value: Outcome<R>) -> Result<()> {
        // Only owned data may live across the write: `R` is `Send` but not necessarily `Sync`.
        let failed = value.is_failed();
        let line = format!("{value}\n");
        drop(value);

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|source| PipelineError::OutputWrite { index, source })?;

        if failed {
            self.failed += 1;
        }
        if let Some(ref callback) = self.on_progress {
            callback(&Progress {
                written: index + 1,
                failed: self.failed,
                buffered: self.buffer.len(),
            });
        }
        Ok(())
    }

    fn check_growth(&mut self) {
        if let Some(threshold) = self.warn_threshold
            && !self.warned
            && self.buffer.len() > threshold
        {
            self.warned = true;
            warn!(
                buffered = self.buffer.len(),
                next_expected = self.buffer.next_expected(),
                "reorder buffer past threshold, waiting on a slow item"
            );
        }
    }
}
