//! Immutable configuration and the values that flow through the queues.

mod item;
mod options;

pub use item::{IndexedItem, IndexedResult, Outcome};
pub use options::{PipelineOptions, PipelineSummary, Progress};
