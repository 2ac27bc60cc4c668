//! Wire layer errors.

use core::fmt;

/// Errors raised while framing, planning or decoding chunk datagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Destination buffer cannot hold the encoded datagram.
    BufferTooSmall,
    /// Datagram does not start with the protocol magic.
    InvalidMagic,
    /// Datagram carries an unsupported protocol version.
    VersionMismatch,
    /// Reserved flags byte is not zero.
    InvalidFlags,
    /// `chunk_id` is not below `total_chunks`.
    InvalidChunkIndex,
    /// Payload exceeds the chunk capacity.
    PayloadTooLarge,
    /// `payload_len` disagrees with the bytes actually carried.
    PayloadLengthMismatch,
    /// Byte source has zero length.
    EmptySource,
    /// Byte source needs more chunks than the 16-bit counter can express.
    TooManyChunks,
    /// Chunk capacity is zero or above the datagram limit.
    InvalidCapacity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall => write!(f, "Buffer too small"),
            Error::InvalidMagic => write!(f, "Invalid magic number"),
            Error::VersionMismatch => write!(f, "Invalid protocol version"),
            Error::InvalidFlags => write!(f, "Reserved flags must be zero"),
            Error::InvalidChunkIndex => write!(f, "Chunk index out of range"),
            Error::PayloadTooLarge => write!(f, "Payload exceeds chunk capacity"),
            Error::PayloadLengthMismatch => write!(f, "Payload length mismatch"),
            Error::EmptySource => write!(f, "Byte source is empty"),
            Error::TooManyChunks => write!(f, "Byte source needs more than 65535 chunks"),
            Error::InvalidCapacity => write!(f, "Invalid chunk capacity"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err {
            Error::BufferTooSmall | Error::PayloadTooLarge => std::io::ErrorKind::InvalidInput,
            _ => std::io::ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}

/// Result alias used across the wire layer.
pub type Result<T> = core::result::Result<T, Error>;
