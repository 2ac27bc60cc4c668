use std::io;
use std::net::SocketAddr;

use chunkwire::{
    BestEffortSink, ByteSource, COMMAND_BUF_SIZE, ChunkTransfer, Command, FrameIdAllocator, Reply,
};
use log::*;
use tokio::net::UdpSocket;

use crate::config::ServerConfig;
use crate::gpio::OutputPin;

/// Receive side of the control channel. Replies and chunks go out through
/// the same channel's [`BestEffortSink`].
#[allow(async_fn_in_trait)]
pub trait ControlChannel: BestEffortSink {
    /// Waits for one datagram, returning its length and sender.
    async fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

impl ControlChannel for UdpSocket {
    async fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.recv_from(buf).await
    }
}

/// Sequential command server.
///
/// One request is received, parsed, dispatched and answered before the
/// next one is read. A transfer therefore blocks command handling until
/// its last chunk is sent. The only state kept across requests is the
/// frame id counter.
pub struct CtrlServer<C, P, S> {
    channel: C,
    pin: P,
    store: S,
    config: ServerConfig,
    frame_ids: FrameIdAllocator,
}

impl<C, P, S> CtrlServer<C, P, S>
where
    C: ControlChannel,
    P: OutputPin,
    S: ByteSource,
{
    pub fn new(channel: C, pin: P, store: S, config: ServerConfig) -> Self {
        Self {
            channel,
            pin,
            store,
            config,
            frame_ids: FrameIdAllocator::new(),
        }
    }

    /// Serves requests forever. Receive failures are never fatal.
    pub async fn run(&mut self) {
        info!("Serving commands: LedOn | LedOff | Transfer [<port>]");
        loop {
            self.serve_once().await;
        }
    }

    /// Handles one inbound datagram and answers its sender.
    ///
    /// Returns `None` when nothing was received (receive error or empty
    /// datagram); no reply is sent in that case. Datagrams longer than
    /// [`COMMAND_BUF_SIZE`] are answered `ERR` without being parsed.
    pub async fn serve_once(&mut self) -> Option<Reply> {
        // One spare byte tells a truncated datagram from a full-size one.
        let mut buf = [0u8; COMMAND_BUF_SIZE + 1];
        let (n, peer) = match self.channel.recv_datagram(&mut buf).await {
            Ok((0, peer)) => {
                debug!("Ignoring empty datagram from {}", peer);
                return None;
            }
            Ok(received) => received,
            Err(e) => {
                debug!("Receive error ignored: {}", e);
                return None;
            }
        };

        let reply = if n > COMMAND_BUF_SIZE {
            warn!("Rejected oversized datagram from {}", peer);
            Reply::Err
        } else {
            self.handle_datagram(&buf[..n], peer).await
        };
        if let Err(e) = self.channel.send_datagram(reply.as_bytes(), peer).await {
            warn!("Failed to send {} to {}: {}", reply, peer, e);
        }
        Some(reply)
    }

    /// Parses and executes one command, returning the status for its sender.
    pub async fn handle_datagram(&mut self, raw: &[u8], peer: SocketAddr) -> Reply {
        let command = match Command::parse(raw) {
            Ok(command) => command,
            Err(e) => {
                warn!(
                    "Rejected command from {}: {} ({:?})",
                    peer,
                    e,
                    String::from_utf8_lossy(raw)
                );
                return Reply::Err;
            }
        };
        debug!("Command {} from {}", command, peer);

        if let Some(port) = command.transfer_port(self.config.default_transfer_port) {
            // Chunks go to the peer's address, on the requested port
            // rather than the port the command came from.
            return self.transfer(SocketAddr::new(peer.ip(), port)).await;
        }
        self.set_pin(command == Command::LedOn)
    }

    fn set_pin(&mut self, on: bool) -> Reply {
        match self.pin.set(on) {
            Ok(()) => Reply::Ok,
            Err(e) => {
                error!("Failed to drive output pin {}: {}", on, e);
                Reply::Err
            }
        }
    }

    async fn transfer(&mut self, target: SocketAddr) -> Reply {
        let Some(frame_id) = self.frame_ids.allocate() else {
            error!("Frame ids exhausted, refusing transfer to {}", target);
            return Reply::Err;
        };
        let path = &self.config.image_path;
        let transfer = ChunkTransfer::new(&self.channel, self.config.transfer);

        match transfer.send_file(&self.store, path, target, frame_id).await {
            Ok(summary) => {
                info!("Sent '{}' ({})", path.display(), summary);
                Reply::Ok
            }
            Err(e) => {
                warn!(
                    "Transfer of '{}' frame_id={} to {} failed: {}",
                    path.display(),
                    frame_id,
                    target,
                    e
                );
                Reply::Err
            }
        }
    }
}
