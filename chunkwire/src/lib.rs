//! # chunkwire - Chunked datagram framing for a UDP control endpoint
//!
//! chunkwire implements the wire side of a small embedded control endpoint:
//!
//! - **Text command protocol**: `LedOn`, `LedOff`, `Transfer [<port>]`,
//!   answered with `OK\n` or `ERR\n`
//! - **Chunk framing**: a byte source is split into length-bounded chunks,
//!   each carried in one datagram behind a fixed 14-byte header
//! - **Frame identifiers**: one monotonically increasing id per transfer
//! - **Best-effort transfer engine** (`std` feature): paced, fire-and-forget
//!   emission of every chunk of a frame over any datagram sink
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Control endpoint / client                │
//! ├─────────────────────────────────────────────────────────┤
//! │                  Transfer Layer (std)                    │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │ ByteSource  │ │  Pacing     │ │ BestEffortSink  │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Wire Layer (no_std)                   │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │ ChunkHeader │ │  ChunkPlan  │ │ Command / Reply │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chunkwire::{ChunkPlan, Command};
//!
//! let plan = ChunkPlan::new(2500, 1400).unwrap();
//! assert_eq!(plan.total_chunks(), 2);
//! assert_eq!(plan.payload_len(1), Some(1100));
//!
//! let cmd = Command::parse(b"Transfer 9000\r\n").unwrap();
//! assert_eq!(cmd, Command::Transfer { port: Some(9000) });
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod error;
pub mod frame_id;
#[cfg(feature = "std")]
pub mod transfer;
pub mod wire;

// Re-export commonly used types
pub use command::{Command, ParseError, Reply};
pub use config::TransferConfig;
pub use error::{Error, Result};
pub use frame_id::FrameIdAllocator;
#[cfg(feature = "std")]
pub use transfer::{
    BestEffortSink, ByteSource, ChunkTransfer, FileStore, TransferError, TransferSummary,
};
pub use wire::{ChunkHeader, ChunkPlan, Datagram, HEADER_SIZE, encode_chunk, split_datagram};

/// Protocol tag carried in the first two bytes of every chunk datagram.
pub const MAGIC: u16 = 0xCAFE;

/// Protocol version
pub const VERSION: u8 = 1;

/// Well-known control port.
pub const CONTROL_PORT: u16 = 50000;

/// Transfer port used when a `Transfer` command carries no port.
pub const DEFAULT_TRANSFER_PORT: u16 = 50001;

/// Default chunk payload capacity in bytes.
pub const DEFAULT_CHUNK_CAPACITY: usize = 1400;

/// Largest accepted chunk capacity: 1500 byte MTU minus IPv4, UDP and chunk headers.
pub const MAX_CHUNK_CAPACITY: usize = 1500 - 20 - 8 - HEADER_SIZE;

/// Largest datagram the transfer channel ever emits.
pub const MAX_DATAGRAM_SIZE: usize = HEADER_SIZE + MAX_CHUNK_CAPACITY;

/// Default delay between two chunk sends, in milliseconds.
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 1;

/// Receive buffer size for control datagrams.
pub const COMMAND_BUF_SIZE: usize = 128;
