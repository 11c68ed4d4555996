//! Chunk partitioning.

use crate::error::PlanError;
use serde::Serialize;
use std::ops::Range;

/// How a sequence of `count` items splits into chunks of `batch_size`.
///
/// Chunk `i < full_chunks()` covers `[i * batch_size, (i + 1) * batch_size)`.
/// When the count is not a multiple of the batch size, one more chunk at
/// index `full_chunks()` covers the trailing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    count: usize,
    batch_size: usize,
    full: usize,
    remainder: usize,
}

impl ChunkPlan {
    pub fn new(count: usize, batch_size: usize) -> Result<Self, PlanError> {
        if batch_size == 0 {
            return Err(PlanError::InvalidBatch);
        }
        if count == 0 {
            return Err(PlanError::EmptyItems);
        }
        Ok(Self {
            count,
            batch_size,
            full: count / batch_size,
            remainder: count % batch_size,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of chunks holding exactly `batch_size` items.
    pub fn full_chunks(&self) -> usize {
        self.full
    }

    /// Length of the trailing short chunk, `0` if there is none.
    pub fn remainder(&self) -> usize {
        self.remainder
    }

    /// The whole input fits in one chunk and bypasses dispatch entirely.
    pub fn is_single_chunk(&self) -> bool {
        self.full == 0 || self.batch_size >= self.count
    }

    pub fn chunk_count(&self) -> usize {
        if self.is_single_chunk() {
            1
        } else {
            self.full + usize::from(self.remainder > 0)
        }
    }

    /// Items covered by the full chunks; the remainder starts here.
    pub fn full_len(&self) -> usize {
        if self.is_single_chunk() {
            self.count
        } else {
            self.full * self.batch_size
        }
    }

    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.chunk_count() {
            return None;
        }
        if self.is_single_chunk() {
            return Some(0..self.count);
        }
        let start = index * self.batch_size;
        Some(start..(start + self.batch_size).min(self.count))
    }

    /// All chunk ranges in index order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> {
        let plan = *self;
        (0..plan.chunk_count()).filter_map(move |i| plan.range(i))
    }
}
