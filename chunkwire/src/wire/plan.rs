//! Chunk planning for a byte source of known length.
//!
//! A frame is the whole byte source. It is cut into `total_chunks`
//! chunks of exactly `capacity` bytes, except the last one which carries
//! the remainder. Planning happens before any datagram is emitted, so
//! an unusable source is rejected without touching the network.

use crate::MAX_CHUNK_CAPACITY;
use crate::error::{Error, Result};

/// Partition of one byte source into ordered chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Total length of the byte source.
    source_len: u64,

    /// Payload capacity of every chunk but the last.
    capacity: usize,

    /// Number of chunks in the frame.
    total_chunks: u16,
}

impl ChunkPlan {
    /// Plans the chunks of a source of `source_len` bytes.
    ///
    /// # Errors
    ///
    /// * `InvalidCapacity` if `capacity` is zero or above [`MAX_CHUNK_CAPACITY`]
    /// * `EmptySource` if `source_len` is zero
    /// * `TooManyChunks` if the chunk count does not fit in 16 bits
    pub fn new(source_len: u64, capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_CHUNK_CAPACITY {
            return Err(Error::InvalidCapacity);
        }

        if source_len == 0 {
            return Err(Error::EmptySource);
        }

        let total = source_len.div_ceil(capacity as u64);
        let total_chunks = u16::try_from(total).map_err(|_| Error::TooManyChunks)?;

        Ok(Self {
            source_len,
            capacity,
            total_chunks,
        })
    }

    /// Returns the number of chunks in the frame.
    pub const fn total_chunks(&self) -> u16 {
        self.total_chunks
    }

    /// Returns the byte offset of a chunk within the source.
    pub fn offset(&self, chunk_id: u16) -> Option<u64> {
        if chunk_id >= self.total_chunks {
            return None;
        }
        Some(chunk_id as u64 * self.capacity as u64)
    }

    /// Returns the payload length of a chunk.
    ///
    /// Every chunk carries `capacity` bytes except the last, which carries
    /// `source_len - capacity * (total_chunks - 1)`, always in `(0, capacity]`.
    pub fn payload_len(&self, chunk_id: u16) -> Option<usize> {
        let offset = self.offset(chunk_id)?;
        let remaining = self.source_len - offset;
        Some(core::cmp::min(remaining, self.capacity as u64) as usize)
    }

    /// Iterates over `(chunk_id, payload_len)` in emission order.
    pub fn chunks(&self) -> Chunks {
        Chunks {
            plan: *self,
            next: 0,
        }
    }
}

/// Iterator over the chunks of a [`ChunkPlan`], in increasing `chunk_id` order.
#[derive(Debug, Clone)]
pub struct Chunks {
    plan: ChunkPlan,
    next: u16,
}

impl Iterator for Chunks {
    type Item = (u16, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let chunk_id = self.next;
        let len = self.plan.payload_len(chunk_id)?;
        self.next += 1;
        Some((chunk_id, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.plan.total_chunks - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Chunks {}
