use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chunkwire::{Command, DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_DELAY_MS};
use clap::{Parser, Subcommand, ValueEnum};

/// How long to wait for the server's status reply.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Parser)]
#[command(name = "ctrl-client", version, about = "Operator console for the UDP control server")]
pub struct Cli {
    /// Control server address
    #[arg(short, long, global = true, default_value = "127.0.0.1:50000")]
    pub server: SocketAddr,

    /// Reply timeout in milliseconds
    #[arg(short, long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Switch the LED
    Led {
        #[arg(value_enum)]
        state: LedState,
    },

    /// Ask the server to stream its image to this host
    Transfer {
        /// Port the chunks are sent to (server default when omitted)
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },

    /// Send an arbitrary command line
    Raw { text: String },

    /// Stream a local file to a receiver without going through the server
    Push {
        /// Receiver address, e.g. 192.168.1.20:50001
        dest: SocketAddr,

        /// File to send
        file: PathBuf,

        /// Payload bytes per chunk datagram
        #[arg(long, default_value_t = DEFAULT_CHUNK_CAPACITY)]
        chunk_size: usize,

        /// Pause after every chunk, in milliseconds
        #[arg(long, default_value_t = DEFAULT_CHUNK_DELAY_MS)]
        chunk_delay_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedState {
    On,
    Off,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Action {
    /// Text of the control datagram, or `None` for actions that bypass the
    /// control channel.
    pub fn control_text(&self) -> Option<String> {
        let command = match self {
            Action::Led { state: LedState::On } => Command::LedOn,
            Action::Led { state: LedState::Off } => Command::LedOff,
            Action::Transfer { port } => Command::Transfer { port: *port },
            Action::Raw { text } => return Some(text.clone()),
            Action::Push { .. } => return None,
        };
        Some(command.to_string())
    }
}
