//! Pure transformations.

mod reorder;

pub use reorder::{ReorderBuffer, ReorderError};
