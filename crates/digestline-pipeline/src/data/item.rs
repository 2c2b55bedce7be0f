use std::fmt;

/// A work unit tagged with its zero-based position in the input.
///
/// The index is assigned once by the source and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedItem<T> {
    pub index: u64,
    pub payload: T,
}

impl<T> IndexedItem<T> {
    pub fn new(index: u64, payload: T) -> Self { Self { index, payload } }
}

/// The outcome of processing one [`IndexedItem`], carrying the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedResult<R> {
    pub index: u64,
    pub value: Outcome<R>,
}

impl<R> IndexedResult<R> {
    pub fn new(index: u64, value: Outcome<R>) -> Self { Self { index, value } }
}

/// A processed value, or the marker left behind by a failed item.
///
/// `Failed` displays as an empty string so a failed item still occupies its
/// line in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    Value(R),
    Failed,
}

impl<R> Outcome<R> {
    pub fn is_failed(&self) -> bool { matches!(self, Outcome::Failed) }

    pub fn value(&self) -> Option<&R> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Failed => None,
        }
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R> {
    fn from(result: Result<R, E>) -> Self {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(_) => Outcome::Failed,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => v.fmt(f),
            Outcome::Failed => Ok(()),
        }
    }
}
