//! Order-preserving concurrent pipeline.
//!
//! Items are read from a line-oriented source, tagged with their position,
//! processed by a bounded pool of workers in whatever order the workers pick
//! them up, and written back out strictly in input order.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Indexed items, outcomes and pipeline options
//! - [`core`] - The reorder buffer, a pure single-owner structure
//! - [`effects`] - Source, worker pool, sequencer and the coordinator that wires them
//!
//! # Example
//!
//! ```no_run
//! use digestline_pipeline::{Pipeline, PipelineOptions, from_fn};
//!
//! # async fn run() -> Result<(), digestline_pipeline::PipelineError> {
//! let pipeline = Pipeline::new(PipelineOptions::default());
//! let upper = from_fn(|line: String| async move { Ok::<_, std::io::Error>(line.to_uppercase()) });
//! let summary = pipeline.run_files("input.txt", "output.txt", upper).await?;
//! println!("{} records written", summary.written);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{ReorderBuffer, ReorderError};
pub use data::{IndexedItem, IndexedResult, Outcome, PipelineOptions, PipelineSummary, Progress};
pub use effects::{Pipeline, ProcessFn, Processor, Sequencer, SequencerReport, WorkerPool, feed_lines, from_fn};
pub use error::{PipelineError, Result};
