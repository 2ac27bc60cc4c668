//! Best-effort chunked transfer engine.
//!
//! A transfer opens a byte source, plans its chunks, and emits one
//! datagram per chunk in increasing `chunk_id` order, pausing a fixed
//! delay after every send. Nothing is acknowledged or retransmitted: the
//! first read or send failure aborts the whole transfer and the caller
//! reports it out of band.
//!
//! # Example
//!
//! ```rust,ignore
//! use chunkwire::transfer::{ChunkTransfer, FileStore};
//!
//! let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await?;
//! let transfer = ChunkTransfer::new(&socket, TransferConfig::default());
//! let summary = transfer
//!     .send_file(&FileStore, Path::new("image.jpg"), "192.168.1.20:50001".parse()?, 1)
//!     .await?;
//! ```

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::Path;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::UdpSocket;

use crate::MAX_CHUNK_CAPACITY;
use crate::config::TransferConfig;
use crate::wire::{ChunkHeader, ChunkPlan, encode_chunk};

/// Fire-and-forget datagram transmission.
///
/// A successful return only means the datagram left the local stack.
/// A reliable variant (acknowledged, retried) would sit behind the same
/// chunk framing and is not provided here.
#[allow(async_fn_in_trait)]
pub trait BestEffortSink {
    /// Sends one datagram to `target`, returning the number of bytes sent.
    async fn send_datagram(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize>;
}

impl BestEffortSink for UdpSocket {
    async fn send_datagram(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.send_to(datagram, target).await
    }
}

/// Readable byte source with a length known up front.
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    /// Reader positioned at the first byte of the source.
    type Reader: AsyncRead + Unpin;

    /// Opens `path`, returning the reader and the total length in bytes.
    async fn open(&self, path: &Path) -> io::Result<(Self::Reader, u64)>;
}

/// Byte source backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStore;

impl ByteSource for FileStore {
    type Reader = tokio::fs::File;

    async fn open(&self, path: &Path) -> io::Result<(Self::Reader, u64)> {
        let file = tokio::fs::File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }
        Ok((file, metadata.len()))
    }
}

/// Why a transfer was aborted.
#[derive(Debug)]
pub enum TransferError {
    /// Source could not be opened, is empty, or is too large to frame.
    InvalidSource(io::Error),

    /// Source ended before the announced length.
    ReadError {
        /// Chunk being read.
        chunk_id: u16,
        /// Underlying read failure.
        source: io::Error,
    },

    /// Datagram transmission failed.
    SendFailed {
        /// Chunk being sent.
        chunk_id: u16,
        /// Underlying send failure.
        source: io::Error,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::InvalidSource(e) => write!(f, "Invalid byte source: {}", e),
            TransferError::ReadError { chunk_id, source } => {
                write!(f, "Read error at chunk {}: {}", chunk_id, source)
            }
            TransferError::SendFailed { chunk_id, source } => {
                write!(f, "Send failed at chunk {}: {}", chunk_id, source)
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::InvalidSource(e) => Some(e),
            TransferError::ReadError { source, .. } | TransferError::SendFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Outcome of a completed transfer, for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    /// Frame the chunks were tagged with.
    pub frame_id: u32,
    /// Number of datagrams sent.
    pub chunks_sent: u16,
    /// Number of payload bytes sent.
    pub bytes_sent: u64,
    /// Destination of the chunks.
    pub target: SocketAddr,
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes frame_id={} chunks={} to {}",
            self.bytes_sent, self.frame_id, self.chunks_sent, self.target
        )
    }
}

/// Chunked sender bound to one datagram sink.
pub struct ChunkTransfer<'a, K: ?Sized> {
    sink: &'a K,
    config: TransferConfig,
}

impl<'a, K: BestEffortSink + ?Sized> ChunkTransfer<'a, K> {
    /// Creates a sender emitting through `sink`.
    pub fn new(sink: &'a K, config: TransferConfig) -> Self {
        Self { sink, config }
    }

    /// Opens `path` on `source` and streams it to `target` as frame `frame_id`.
    pub async fn send_file<S: ByteSource + ?Sized>(
        &self,
        source: &S,
        path: &Path,
        target: SocketAddr,
        frame_id: u32,
    ) -> Result<TransferSummary, TransferError> {
        let (reader, len) = source
            .open(path)
            .await
            .map_err(TransferError::InvalidSource)?;
        self.send_reader(reader, len, target, frame_id).await
    }

    /// Streams `source_len` bytes of `reader` to `target` as frame `frame_id`.
    ///
    /// The source is planned before anything is sent, so an empty or
    /// oversized source produces no datagram at all.
    pub async fn send_reader<R: AsyncRead + Unpin>(
        &self,
        mut reader: R,
        source_len: u64,
        target: SocketAddr,
        frame_id: u32,
    ) -> Result<TransferSummary, TransferError> {
        let plan = ChunkPlan::new(source_len, self.config.chunk_capacity)
            .map_err(|e| TransferError::InvalidSource(e.into()))?;
        let total_chunks = plan.total_chunks();

        let mut payload = [0u8; MAX_CHUNK_CAPACITY];
        for (chunk_id, len) in plan.chunks() {
            let payload = &mut payload[..len];
            reader
                .read_exact(payload)
                .await
                .map_err(|source| TransferError::ReadError { chunk_id, source })?;

            let header = ChunkHeader::new(frame_id, chunk_id, total_chunks, len as u16);
            let datagram = encode_chunk(&header, payload)
                .map_err(|e| TransferError::SendFailed { chunk_id, source: e.into() })?;

            let sent = self
                .sink
                .send_datagram(&datagram, target)
                .await
                .map_err(|source| TransferError::SendFailed { chunk_id, source })?;
            if sent != datagram.len() {
                return Err(TransferError::SendFailed {
                    chunk_id,
                    source: io::Error::new(io::ErrorKind::WriteZero, "datagram truncated"),
                });
            }
            trace!(
                "Sent chunk frame_id={} chunk={}/{} len={}",
                frame_id, chunk_id, total_chunks, len
            );

            if !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }

        Ok(TransferSummary {
            frame_id,
            chunks_sent: total_chunks,
            bytes_sent: source_len,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::wire::split_datagram;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Records every datagram; fails the send with index `fail_at`.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
        fail_at: Option<usize>,
    }

    impl RecordingSink {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Default::default()
            }
        }

        fn datagrams(&self) -> Vec<(Vec<u8>, SocketAddr)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl BestEffortSink for RecordingSink {
        async fn send_datagram(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_at == Some(sent.len()) {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"));
            }
            sent.push((datagram.to_vec(), target));
            Ok(datagram.len())
        }
    }

    /// In-memory files; `claimed_len` overrides the reported length.
    #[derive(Default)]
    struct MemoryStore {
        files: HashMap<PathBuf, Vec<u8>>,
        claimed_len: Option<u64>,
    }

    impl MemoryStore {
        fn with_file(path: &str, data: Vec<u8>) -> Self {
            let mut store = Self::default();
            store.files.insert(PathBuf::from(path), data);
            store
        }
    }

    impl ByteSource for MemoryStore {
        type Reader = Cursor<Vec<u8>>;

        async fn open(&self, path: &Path) -> io::Result<(Self::Reader, u64)> {
            let data = self
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
            let len = self.claimed_len.unwrap_or(data.len() as u64);
            Ok((Cursor::new(data), len))
        }
    }

    fn target() -> SocketAddr {
        "192.168.1.20:50001".parse().unwrap()
    }

    fn unpaced() -> TransferConfig {
        TransferConfig::new().with_chunk_delay(Duration::ZERO)
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_chunks_framed_in_order() {
        let data = pattern(2500);
        let store = MemoryStore::with_file("/img.jpg", data.clone());
        let sink = RecordingSink::default();
        let transfer = ChunkTransfer::new(&sink, unpaced());

        let summary = transfer
            .send_file(&store, Path::new("/img.jpg"), target(), 42)
            .await
            .unwrap();
        assert_eq!(summary.chunks_sent, 2);
        assert_eq!(summary.bytes_sent, 2500);
        assert_eq!(summary.frame_id, 42);

        let sent = sink.datagrams();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0.len(), 14 + 1400);
        assert_eq!(sent[1].0.len(), 14 + 1100);

        let mut rebuilt = Vec::new();
        for (index, (datagram, to)) in sent.iter().enumerate() {
            assert_eq!(*to, target());
            let (header, payload) = split_datagram(datagram).unwrap();
            assert_eq!(header.frame_id, 42);
            assert_eq!(header.chunk_id as usize, index);
            assert_eq!(header.total_chunks, 2);
            assert!(header.validate(1400).is_ok());
            rebuilt.extend_from_slice(payload);
        }
        assert_eq!(rebuilt, data);
    }

    #[tokio::test]
    async fn test_roundtrip_various_lengths() {
        let config = unpaced().with_chunk_capacity(100);
        for len in [1usize, 99, 100, 101, 1000, 1234] {
            let data = pattern(len);
            let sink = RecordingSink::default();
            let transfer = ChunkTransfer::new(&sink, config);

            let summary = transfer
                .send_reader(Cursor::new(data.clone()), len as u64, target(), 1)
                .await
                .unwrap();
            assert_eq!(summary.chunks_sent as usize, len.div_ceil(100));

            let rebuilt: Vec<u8> = sink
                .datagrams()
                .iter()
                .flat_map(|(d, _)| split_datagram(d).unwrap().1.to_vec())
                .collect();
            assert_eq!(rebuilt, data);
        }
    }

    #[tokio::test]
    async fn test_empty_source_sends_nothing() {
        let store = MemoryStore::with_file("/empty", Vec::new());
        let sink = RecordingSink::default();
        let transfer = ChunkTransfer::new(&sink, unpaced());

        let err = transfer
            .send_file(&store, Path::new("/empty"), target(), 1)
            .await
            .unwrap_err();
        match err {
            TransferError::InvalidSource(e) => {
                let inner = e.get_ref().and_then(|e| e.downcast_ref::<Error>());
                assert_eq!(inner, Some(&Error::EmptySource));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(sink.datagrams().is_empty());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let store = MemoryStore::default();
        let sink = RecordingSink::default();
        let transfer = ChunkTransfer::new(&sink, unpaced());

        let err = transfer
            .send_file(&store, Path::new("/nope"), target(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidSource(ref e) if e.kind() == io::ErrorKind::NotFound));
        assert!(sink.datagrams().is_empty());
    }

    #[tokio::test]
    async fn test_short_read_aborts() {
        let mut store = MemoryStore::with_file("/img", pattern(3000));
        store.claimed_len = Some(5000);
        let sink = RecordingSink::default();
        let transfer = ChunkTransfer::new(&sink, unpaced());

        let err = transfer
            .send_file(&store, Path::new("/img"), target(), 1)
            .await
            .unwrap_err();
        // Chunks 0 and 1 are complete, chunk 2 only has 200 of 1400 bytes.
        assert!(matches!(err, TransferError::ReadError { chunk_id: 2, .. }));
        assert_eq!(sink.datagrams().len(), 2);
    }

    #[tokio::test]
    async fn test_send_failure_aborts() {
        let sink = RecordingSink::failing_at(1);
        let transfer = ChunkTransfer::new(&sink, unpaced());

        let err = transfer
            .send_reader(Cursor::new(pattern(5000)), 5000, target(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::SendFailed { chunk_id: 1, .. }));
        assert_eq!(sink.datagrams().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_source_rejected() {
        let sink = RecordingSink::default();
        let transfer = ChunkTransfer::new(&sink, unpaced().with_chunk_capacity(1));

        let err = transfer
            .send_reader(Cursor::new(Vec::new()), 65536, target(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidSource(_)));
        assert!(sink.datagrams().is_empty());
    }

    #[tokio::test]
    async fn test_pacing_delay() {
        let sink = RecordingSink::default();
        let config = TransferConfig::new()
            .with_chunk_capacity(10)
            .with_chunk_delay(Duration::from_millis(5));
        let transfer = ChunkTransfer::new(&sink, config);

        let start = Instant::now();
        transfer
            .send_reader(Cursor::new(pattern(30)), 30, target(), 1)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert_eq!(sink.datagrams().len(), 3);
    }

    #[tokio::test]
    async fn test_file_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &pattern(3000)).unwrap();

        let (_, len) = FileStore.open(file.path()).await.unwrap();
        assert_eq!(len, 3000);

        let dir = tempfile::tempdir().unwrap();
        let err = FileStore.open(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_udp_loopback_transfer() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let data = pattern(3000);

        let transfer = ChunkTransfer::new(&sender, TransferConfig::default());
        let summary = transfer
            .send_reader(Cursor::new(data.clone()), 3000, receiver.local_addr().unwrap(), 7)
            .await
            .unwrap();
        assert_eq!(summary.chunks_sent, 3);

        let mut rebuilt = Vec::new();
        let mut buf = [0u8; 2048];
        for expected in 0..3u16 {
            let n = receiver.recv(&mut buf).await.unwrap();
            let (header, payload) = split_datagram(&buf[..n]).unwrap();
            assert_eq!(header.chunk_id, expected);
            assert_eq!(header.frame_id, 7);
            rebuilt.extend_from_slice(payload);
        }
        assert_eq!(rebuilt, data);
    }
}
