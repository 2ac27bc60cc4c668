use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use chunkwire::{COMMAND_BUF_SIZE, Reply};
use log::*;
use tokio::net::UdpSocket;

#[derive(Debug)]
pub enum ClientError {
    Io(io::Error),
    /// Nothing came back from the server in time.
    NoReply(Duration),
    /// The server answered with something other than `OK` / `ERR`.
    UnexpectedReply(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(e) => write!(f, "IO error: {}", e),
            ClientError::NoReply(timeout) => write!(f, "No reply within {:?}", timeout),
            ClientError::UnexpectedReply(text) => write!(f, "Unexpected reply {:?}", text),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}

/// Sends control datagrams to one server and waits for its status replies.
pub struct CtrlClient {
    socket: UdpSocket,
    server: SocketAddr,
    timeout: Duration,
}

impl CtrlClient {
    pub async fn connect(server: SocketAddr, timeout: Duration) -> io::Result<Self> {
        let local = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        debug!("Bound {} for server {}", socket.local_addr()?, server);
        Ok(Self {
            socket,
            server,
            timeout,
        })
    }

    /// Sends `text` as one datagram and returns the server's reply.
    ///
    /// Datagrams from other peers are discarded while waiting.
    pub async fn send_command(&self, text: &str) -> Result<Reply, ClientError> {
        info!("Sending {:?} to {}", text, self.server);
        self.socket.send_to(text.as_bytes(), self.server).await?;

        let mut buf = [0u8; COMMAND_BUF_SIZE];
        let n = match tokio::time::timeout(self.timeout, self.recv_reply(&mut buf)).await {
            Ok(received) => received?,
            Err(_) => return Err(ClientError::NoReply(self.timeout)),
        };
        Reply::parse(&buf[..n])
            .ok_or_else(|| ClientError::UnexpectedReply(String::from_utf8_lossy(&buf[..n]).into()))
    }

    async fn recv_reply(&self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let (n, from) = self.socket.recv_from(buf).await?;
            if from == self.server {
                return Ok(n);
            }
            debug!("Ignoring {} bytes from {}", n, from);
        }
    }
}
