use std::collections::BTreeMap;

use thiserror::Error;

/// Violations of the reorder buffer's invariants.
///
/// None of these can happen while every index is delivered exactly once; they
/// indicate a lost or re-delivered item upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("index {index} was already flushed (next expected is {next_expected})")]
    Stale { index: u64, next_expected: u64 },

    #[error("index {index} is already buffered")]
    Duplicate { index: u64 },

    #[error("index {next_expected} never arrived; {buffered} later results still buffered")]
    Gap { next_expected: u64, buffered: usize },
}

/// Holds results that arrived ahead of their turn.
///
/// Every buffered key is at least `next_expected`. Keys below it have been
/// handed out by [`pop_ready`](Self::pop_ready) exactly once.
#[derive(Debug)]
pub struct ReorderBuffer<R> {
    pending: BTreeMap<u64, R>,
    next_expected: u64,
    high_water: usize,
}

impl<R> Default for ReorderBuffer<R> {
    fn default() -> Self { Self::new() }
}

impl<R> ReorderBuffer<R> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_expected: 0,
            high_water: 0,
        }
    }

    /// Buffer a result.
    ///
    /// Re-delivery of an index, whether already flushed or still waiting, is
    /// rejected and leaves the buffer untouched.
    pub fn insert(&mut self, index: u64, value: R) -> Result<(), ReorderError> {
        if index < self.next_expected {
            return Err(ReorderError::Stale {
                index,
                next_expected: self.next_expected,
            });
        }
        if self.pending.contains_key(&index) {
            return Err(ReorderError::Duplicate { index });
        }

        self.pending.insert(index, value);
        self.high_water = self.high_water.max(self.pending.len());
        Ok(())
    }

    /// Take the value at `next_expected`, if it has arrived, and advance.
    pub fn pop_ready(&mut self) -> Option<(u64, R)> {
        let index = self.next_expected;
        let value = self.pending.remove(&index)?;
        self.next_expected += 1;
        Some((index, value))
    }

    pub fn next_expected(&self) -> u64 { self.next_expected }

    pub fn len(&self) -> usize { self.pending.len() }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    /// Largest number of results ever held at once.
    pub fn high_water(&self) -> usize { self.high_water }

    /// Close the buffer once no more results can arrive.
    ///
    /// Anything still buffered sits behind an index that was never delivered.
    pub fn finish(self) -> Result<u64, ReorderError> {
        if self.pending.is_empty() {
            Ok(self.next_expected)
        } else {
            Err(ReorderError::Gap {
                next_expected: self.next_expected,
                buffered: self.pending.len(),
            })
        }
    }
}
