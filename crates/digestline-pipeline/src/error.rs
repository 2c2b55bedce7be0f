//! Error types for digestline-pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::ReorderError;

/// Fatal pipeline errors.
///
/// Per-item processing failures never show up here: a worker turns them into
/// [`Outcome::Failed`](crate::Outcome::Failed) and keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open input {path}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input line {line}: {source}")]
    InputRead {
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output {path}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output record {index}: {source}")]
    OutputWrite {
        index: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to flush output: {0}")]
    OutputFlush(#[source] io::Error),

    #[error("reorder buffer invariant violated: {0}")]
    Reorder(#[from] ReorderError),

    #[error("worker {worker} panicked: {source}")]
    WorkerPanicked {
        worker: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("pipeline task failed: {0}")]
    TaskFailed(#[source] tokio::task::JoinError),

    #[error("incomplete output: {produced} items read but {written} records written")]
    Incomplete { produced: u64, written: u64 },

    #[error("pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Whether this error only reports that another component aborted the run.
    pub fn is_cancelled(&self) -> bool { matches!(self, PipelineError::Cancelled) }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
