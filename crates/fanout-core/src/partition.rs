//! Contiguous index partitioning.
//!
//! [`partition`] splits `[0, n)` into exactly `workers` contiguous,
//! non-overlapping [`Partition`]s. The first `workers - 1` partitions get
//! `n / workers` indices each; the last one takes whatever remains, so no
//! index is lost when `n` is not a multiple of `workers`.

use std::ops::Range;

use crate::error::PartitionError;

/// One worker's share of the index space: `[offset, offset + len)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    /// First index covered by this partition.
    pub offset: usize,
    /// Number of indices covered. Zero only when `n < workers`.
    pub len: usize,
}

impl Partition {
    /// One past the last index covered.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The covered indices as a range.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Returns `true` if the partition covers no indices.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Iterator over the partitions of `[0, n)`, in ascending offset order.
///
/// Created by [`partition`].
#[derive(Clone, Debug)]
pub struct Partitions {
    n: usize,
    workers: usize,
    chunk: usize,
    next: usize,
}

impl Partitions {
    /// Total number of indices being partitioned.
    pub fn element_count(&self) -> usize {
        self.n
    }

    /// Number of partitions (one per worker).
    pub fn worker_count(&self) -> usize {
        self.workers
    }
}

impl Iterator for Partitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.next >= self.workers {
            return None;
        }
        let w = self.next;
        self.next += 1;
        let offset = w * self.chunk;
        let len = if w + 1 == self.workers {
            self.n - offset
        } else {
            self.chunk
        };
        Some(Partition { offset, len })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.workers - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Partitions {}

/// Split `[0, n)` across `workers` partitions.
///
/// # Errors
///
/// Returns [`PartitionError::ZeroWorkers`] if `workers == 0`.
pub fn partition(n: usize, workers: usize) -> Result<Partitions, PartitionError> {
    if workers == 0 {
        return Err(PartitionError::ZeroWorkers);
    }
    Ok(Partitions {
        n,
        workers,
        chunk: n / workers,
        next: 0,
    })
}
