//! Tasks and I/O: the source, the worker pool, the sequencer and the
//! coordinator that runs them together.

mod pipeline;
mod processor;
mod sequencer;
mod source;
mod worker;

pub use pipeline::Pipeline;
pub use processor::{ProcessFn, Processor, from_fn};
pub use sequencer::{Sequencer, SequencerReport};
pub use source::feed_lines;
pub use worker::WorkerPool;
