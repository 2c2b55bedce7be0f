use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

const DEFAULT_WORKERS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1);

/// Configuration for a [`Pipeline`](crate::Pipeline) run.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use digestline_pipeline::PipelineOptions;
///
/// let options = PipelineOptions::default()
///     .num_workers(NonZeroUsize::new(8).unwrap())
///     .reorder_warn_threshold(Some(1024));
/// assert_eq!(options.num_workers.get(), 8);
/// ```
#[derive(Clone)]
pub struct PipelineOptions {
    /// Number of concurrent workers.
    ///
    /// Default: 2
    pub num_workers: NonZeroUsize,

    /// Capacity of the queue between the source and the workers.
    ///
    /// The source blocks once this many items are waiting.
    ///
    /// Default: one slot per worker
    pub intake_capacity: NonZeroUsize,

    /// Capacity of the queue between the workers and the sequencer.
    ///
    /// Default: one slot per worker
    pub result_capacity: NonZeroUsize,

    /// Log a warning once the reorder buffer holds more than this many results.
    ///
    /// A single slow item stalls every later one, so a growing buffer is the
    /// first sign of skewed latency.
    ///
    /// Default: None
    pub reorder_warn_threshold: Option<usize>,

    /// Callback invoked by the sequencer after every flushed record.
    ///
    /// Default: None
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("num_workers", &self.num_workers)
            .field("intake_capacity", &self.intake_capacity)
            .field("result_capacity", &self.result_capacity)
            .field("reorder_warn_threshold", &self.reorder_warn_threshold)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_WORKERS,
            intake_capacity: DEFAULT_WORKERS,
            result_capacity: DEFAULT_WORKERS,
            reorder_warn_threshold: None,
            on_progress: None,
        }
    }
}

impl PipelineOptions {
    /// Set the worker count. Queue capacities follow it.
    #[must_use]
    pub fn num_workers(mut self, num_workers: NonZeroUsize) -> Self {
        self.num_workers = num_workers;
        self.intake_capacity = num_workers;
        self.result_capacity = num_workers;
        self
    }

    #[must_use]
    pub fn intake_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    #[must_use]
    pub fn result_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.result_capacity = capacity;
        self
    }

    #[must_use]
    pub fn reorder_warn_threshold(mut self, threshold: Option<usize>) -> Self {
        self.reorder_warn_threshold = threshold;
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

/// Snapshot passed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Records flushed to the output so far.
    pub written: u64,
    /// How many of those were failure markers.
    pub failed: u64,
    /// Results waiting in the reorder buffer for an earlier index.
    pub buffered: usize,
}

/// Totals reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSummary {
    /// Items read from the input.
    pub produced: u64,
    /// Records written to the output. Equal to `produced` on success.
    pub written: u64,
    /// Records written as failure markers.
    pub failed: u64,
    /// Largest size the reorder buffer reached.
    pub reorder_high_water: usize,
}
