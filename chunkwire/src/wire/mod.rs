//! Wire-level building blocks of the transfer channel.
//!
//! This module contains:
//! - Header: the fixed 14-byte chunk header
//! - Plan: partition of a byte source into ordered chunks
//! - Datagram encoding: header + payload in one fixed-capacity buffer

mod header;
mod plan;

pub use header::{ChunkHeader, HEADER_SIZE, split_datagram};
pub use plan::{ChunkPlan, Chunks};

use crate::MAX_DATAGRAM_SIZE;
use crate::error::{Error, Result};

/// One encoded chunk datagram, sized for the largest chunk the channel allows.
pub type Datagram = heapless::Vec<u8, MAX_DATAGRAM_SIZE>;

/// Concatenates a header and its payload into one datagram.
///
/// The header's `payload_len` must match `payload.len()`.
pub fn encode_chunk(header: &ChunkHeader, payload: &[u8]) -> Result<Datagram> {
    if header.payload_len as usize != payload.len() {
        return Err(Error::PayloadLengthMismatch);
    }

    let mut datagram = Datagram::new();
    datagram
        .extend_from_slice(&header.to_bytes())
        .map_err(|_| Error::BufferTooSmall)?;
    datagram
        .extend_from_slice(payload)
        .map_err(|_| Error::PayloadTooLarge)?;

    Ok(datagram)
}
