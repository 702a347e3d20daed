//! Bounded batching for id-list queries.
//!
//! The external store caps the number of values in an `in` or
//! `array-contains-any` filter. Components that look up many documents by
//! id chunk their id lists with [`bounded_batches`], parameterized by a
//! validated [`BatchLimit`] so a zero chunk size is unrepresentable.

use crate::error::{Error, Result};

/// The in-query limit observed on the external store.
pub const DEFAULT_IN_QUERY_LIMIT: usize = 10;

/// A validated, non-zero query batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimit(usize);

impl BatchLimit {
    /// The store's default in-query limit.
    pub const DEFAULT: Self = Self(DEFAULT_IN_QUERY_LIMIT);

    /// Creates a batch limit.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when `limit` is zero.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::invalid_argument("query batch limit must be non-zero"));
        }
        Ok(Self(limit))
    }

    /// Returns the limit value.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Splits `items` into batches no larger than `limit`.
///
/// The final batch holds the remainder; an empty slice yields no batches.
pub fn bounded_batches<T>(items: &[T], limit: BatchLimit) -> std::slice::Chunks<'_, T> {
    items.chunks(limit.get())
}
