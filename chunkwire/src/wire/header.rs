//! Chunk header definition and serialization.
//!
//! Every datagram on the transfer channel starts with this header,
//! immediately followed by `payload_len` bytes of payload.
//!
//! # Header Format
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         Magic (0xCAFE)        |    Version    |     Flags     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           Frame ID                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Chunk ID            |         Total Chunks          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |         Payload Length        |          Payload...           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! All multi-byte fields are big-endian.

use crate::error::{Error, Result};
use crate::{MAGIC, VERSION};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 14;

/// Header placed in front of every chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Protocol tag, always [`MAGIC`] on emitted datagrams.
    pub magic: u16,

    /// Protocol version.
    pub version: u8,

    /// Reserved, zero.
    pub flags: u8,

    /// Identifier of the transfer this chunk belongs to.
    pub frame_id: u32,

    /// Zero-based index of the chunk within the frame.
    pub chunk_id: u16,

    /// Number of chunks in the frame.
    pub total_chunks: u16,

    /// Number of payload bytes following the header.
    pub payload_len: u16,
}

impl ChunkHeader {
    /// Creates a header for one chunk of a frame.
    pub const fn new(frame_id: u32, chunk_id: u16, total_chunks: u16, payload_len: u16) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            frame_id,
            chunk_id,
            total_chunks,
            payload_len,
        }
    }

    /// Returns true if this header describes the final chunk of its frame.
    pub const fn is_last(&self) -> bool {
        self.chunk_id as u32 + 1 == self.total_chunks as u32
    }

    /// Returns the serialized header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.magic.to_be_bytes());
        buf[2] = self.version;
        buf[3] = self.flags;
        buf[4..8].copy_from_slice(&self.frame_id.to_be_bytes());
        buf[8..10].copy_from_slice(&self.chunk_id.to_be_bytes());
        buf[10..12].copy_from_slice(&self.total_chunks.to_be_bytes());
        buf[12..14].copy_from_slice(&self.payload_len.to_be_bytes());
        buf
    }

    /// Decodes a header from the start of a datagram.
    ///
    /// Rejects foreign datagrams (bad magic), other protocol versions and
    /// non-zero reserved flags. Index and length invariants are checked by
    /// [`ChunkHeader::validate`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let magic = u16::from_be_bytes([buf[0], buf[1]]);
        if magic != MAGIC {
            return Err(Error::InvalidMagic);
        }

        let version = buf[2];
        if version != VERSION {
            return Err(Error::VersionMismatch);
        }

        let flags = buf[3];
        if flags != 0 {
            return Err(Error::InvalidFlags);
        }

        Ok(Self {
            magic,
            version,
            flags,
            frame_id: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            chunk_id: u16::from_be_bytes([buf[8], buf[9]]),
            total_chunks: u16::from_be_bytes([buf[10], buf[11]]),
            payload_len: u16::from_be_bytes([buf[12], buf[13]]),
        })
    }

    /// Checks the framing invariants against a chunk capacity.
    pub fn validate(&self, capacity: usize) -> Result<()> {
        if self.chunk_id >= self.total_chunks {
            return Err(Error::InvalidChunkIndex);
        }

        if self.payload_len == 0 {
            return Err(Error::PayloadLengthMismatch);
        }

        if self.payload_len as usize > capacity {
            return Err(Error::PayloadTooLarge);
        }

        // Only the last chunk may be short.
        if !self.is_last() && self.payload_len as usize != capacity {
            return Err(Error::PayloadLengthMismatch);
        }

        Ok(())
    }
}

/// Splits a received datagram into its header and payload.
pub fn split_datagram(buf: &[u8]) -> Result<(ChunkHeader, &[u8])> {
    let header = ChunkHeader::decode(buf)?;
    let end = HEADER_SIZE + header.payload_len as usize;
    if buf.len() != end {
        return Err(Error::PayloadLengthMismatch);
    }
    Ok((header, &buf[HEADER_SIZE..end]))
}
